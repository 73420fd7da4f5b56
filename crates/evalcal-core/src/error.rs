//! Error types for `evalcal-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("invalid evaluation: {0}")]
  Validation(String),

  #[error("unknown {kind}: {value:?}")]
  UnknownCatalogValue { kind: &'static str, value: String },

  #[error("invalid date {0:?}, expected YYYY-MM-DD")]
  InvalidDate(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
