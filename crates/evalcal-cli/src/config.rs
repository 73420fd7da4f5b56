//! Runtime configuration, layered from an optional TOML file and `EVALCAL_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use evalcal_sync::MissingPolicy;
use serde::Deserialize;

/// Which backend the services run on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
  /// In-process demo data; nothing survives the process.
  #[default]
  Memory,
  Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub backend:        BackendKind,
  pub store_path:     PathBuf,
  /// Artificial latency of the memory backend, in milliseconds.
  pub latency_ms:     u64,
  /// How often `watch` checks the backend for writes from elsewhere.
  pub poll_ms:        u64,
  pub missing_policy: MissingPolicy,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      backend:        BackendKind::Memory,
      store_path:     PathBuf::from("~/.local/share/evalcal/calendar.db"),
      latency_ms:     0,
      poll_ms:        1000,
      missing_policy: MissingPolicy::Ignore,
    }
  }
}

impl AppConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("EVALCAL"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: AppConfig = settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn latency(&self) -> Duration { Duration::from_millis(self.latency_ms) }

  pub fn poll_interval(&self) -> Duration { Duration::from_millis(self.poll_ms.max(1)) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let cfg = AppConfig::load(Path::new("/nonexistent/evalcal.toml")).unwrap();
    assert_eq!(cfg.backend, BackendKind::Memory);
    assert_eq!(cfg.missing_policy, MissingPolicy::Ignore);
    assert_eq!(cfg.latency(), Duration::ZERO);
    assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
  }

  #[test]
  fn file_values_override_defaults() {
    let path = std::env::temp_dir().join(format!("evalcal-cfg-{}.toml", std::process::id()));
    std::fs::write(
      &path,
      "backend = \"sqlite\"\nstore_path = \"/tmp/cal.db\"\nmissing_policy = \"reject\"\nlatency_ms = 250\npoll_ms = 0\n",
    )
    .unwrap();

    let cfg = AppConfig::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(cfg.backend, BackendKind::Sqlite);
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/cal.db"));
    assert_eq!(cfg.missing_policy, MissingPolicy::Reject);
    assert_eq!(cfg.latency(), Duration::from_millis(250));
    assert_eq!(cfg.poll_interval(), Duration::from_millis(1));
  }

  #[test]
  fn tilde_is_expanded() {
    let expanded = expand_tilde(Path::new("~/cal.db"));
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expanded, PathBuf::from(home).join("cal.db"));
    }
    assert_eq!(expand_tilde(Path::new("/abs/cal.db")), PathBuf::from("/abs/cal.db"));
  }
}
