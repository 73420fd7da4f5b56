//! Subcommand implementations and the pieces they share.

pub mod edit;
pub mod list;
pub mod teacher;
pub mod watch;

use chrono::NaiveDate;
use clap::Args;
use evalcal_core::{
  backend::{AuthBackend, DocumentBackend},
  catalog::Catalog,
  evaluation::parse_date,
  user::AuthenticatedUser,
};
use evalcal_sync::{AuthSession, DocumentStore, MissingPolicy, Subscription};

/// Everything a backend must provide to drive both services.
pub trait Backend: AuthBackend + DocumentBackend + Clone + Send + Sync + 'static {}

impl<T> Backend for T where T: AuthBackend + DocumentBackend + Clone + Send + Sync + 'static {}

// ─── Services ────────────────────────────────────────────────────────────────

/// The auth session and document store of one CLI invocation, sharing a
/// backend.
pub struct Services<B> {
  pub session: AuthSession<B>,
  pub store:   DocumentStore<B>,
  _auth_log:   Subscription,
}

impl<B: Backend> Services<B> {
  pub fn new(backend: B, policy: MissingPolicy) -> Self {
    let session = AuthSession::new(backend.clone());
    let auth_log = session.subscribe(|state| match state {
      Some(user) => tracing::info!(uid = %user.uid, "session active"),
      None => tracing::debug!("no active session"),
    });
    Self {
      session,
      store: DocumentStore::with_policy(backend, policy),
      _auth_log: auth_log,
    }
  }

  /// Sign in with `credentials`, prompting for the password when it was not
  /// given on the command line or in `EVALCAL_PASSWORD`.
  pub async fn sign_in(&self, credentials: Credentials) -> anyhow::Result<AuthenticatedUser> {
    let password = read_password(credentials.password)?;
    Ok(self.session.sign_in(&credentials.email, &password).await?)
  }
}

#[derive(Args)]
pub struct Credentials {
  /// Teacher account email.
  #[arg(long)]
  pub email:    String,
  #[arg(long, env = "EVALCAL_PASSWORD", hide_env_values = true)]
  pub password: Option<String>,
}

/// Use `given` if present, otherwise read one line from stdin.
pub fn read_password(given: Option<String>) -> anyhow::Result<String> {
  if let Some(password) = given {
    return Ok(password);
  }

  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

// ─── Argument parsers ────────────────────────────────────────────────────────

pub fn catalog<C: Catalog>(s: &str) -> Result<C, String> {
  C::parse_label(s).map_err(|e| {
    let known: Vec<String> = C::all().iter().map(ToString::to_string).collect();
    format!("{e} (one of: {})", known.join(", "))
  })
}

pub fn date(s: &str) -> Result<NaiveDate, String> { parse_date(s).map_err(|e| e.to_string()) }

/// A calendar month given as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
  pub year:  i32,
  pub month: u32,
}

pub fn month(s: &str) -> Result<Month, String> {
  let invalid = || format!("expected YYYY-MM, got {s:?}");
  let (year, month) = s.split_once('-').ok_or_else(invalid)?;
  let year: i32 = year.parse().map_err(|_| invalid())?;
  let month: u32 = month.parse().map_err(|_| invalid())?;
  if !(1..=12).contains(&month) {
    return Err(invalid());
  }
  Ok(Month { year, month })
}
