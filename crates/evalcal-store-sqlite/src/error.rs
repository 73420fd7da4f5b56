//! Error type for `evalcal-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] evalcal_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time decode error: {0}")]
  DateParse(String),

  #[error("password hash error: {0}")]
  PasswordHash(String),

  #[error("a teacher with email {0:?} already exists")]
  DuplicateEmail(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
