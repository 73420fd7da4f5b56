//! `evalcal` — command-line driver for the evaluation calendar.
//!
//! Reads `evalcal.toml` (or the path given with `--config`) and `EVALCAL_*`
//! environment variables, builds the configured backend, and runs one
//! command against the auth session and document store.
//!
//! # Usage
//!
//! ```text
//! evalcal list --course 3°A --month 2024-07
//! EVALCAL_PASSWORD=password123 evalcal add --email profesor@lir.cl \
//!   --date 2024-07-15 --course 3°A --subject Matemática \
//!   --content "Ecuaciones" --instrument Rúbrica --url https://x/y.pdf
//! evalcal watch
//! ```

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use evalcal_store_memory::MemoryBackend;
use evalcal_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
  commands::{Services, edit, list, teacher},
  config::{AppConfig, BackendKind},
};

#[derive(Parser)]
#[command(author, version, about = "School evaluation calendar")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "evalcal.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the calendar, optionally filtered.
  List(list::ListArgs),
  /// Create an evaluation as the signed-in teacher.
  Add(edit::AddArgs),
  /// Change fields of one of your evaluations.
  Edit(edit::EditArgs),
  /// Delete one of your evaluations.
  Remove(edit::RemoveArgs),
  /// Print the calendar and every later change, including writes from
  /// other processes, until interrupted.
  Watch,
  /// Register a teacher account (sqlite backend only).
  AddTeacher {
    #[arg(long)]
    email: String,
  },
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if let Command::HashPassword = cli.command {
    let password = commands::read_password(None)?;
    println!("{}", teacher::hash_password(&password)?);
    return Ok(());
  }

  let cfg = AppConfig::load(&cli.config)?;
  tracing::debug!(?cfg, "configuration loaded");

  match cfg.backend {
    BackendKind::Memory => {
      let backend = MemoryBackend::seeded().with_latency(cfg.latency());
      if let Command::AddTeacher { .. } = cli.command {
        anyhow::bail!("add-teacher needs the sqlite backend");
      }
      run(Services::new(backend, cfg.missing_policy), cli.command, &cfg).await
    }
    BackendKind::Sqlite => {
      if let Some(parent) = cfg.store_path.parent() {
        std::fs::create_dir_all(parent)
          .with_context(|| format!("failed to create {parent:?}"))?;
      }
      let store = SqliteStore::open(&cfg.store_path)
        .await
        .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
      if let Command::AddTeacher { email } = &cli.command {
        return teacher::add_teacher(&store, email).await;
      }
      run(Services::new(store, cfg.missing_policy), cli.command, &cfg).await
    }
  }
}

async fn run<B>(services: Services<B>, command: Command, cfg: &AppConfig) -> anyhow::Result<()>
where
  B: commands::Backend,
{
  match command {
    Command::List(args) => list::run(&services, args).await,
    Command::Add(args) => edit::add(&services, args).await,
    Command::Edit(args) => edit::edit(&services, args).await,
    Command::Remove(args) => edit::remove(&services, args).await,
    Command::Watch => commands::watch::run(&services, cfg.poll_interval()).await,
    Command::AddTeacher { .. } | Command::HashPassword => {
      anyhow::bail!("command is handled before a backend is chosen")
    }
  }
}
