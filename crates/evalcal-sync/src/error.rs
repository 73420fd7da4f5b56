//! Error type for `evalcal-sync`.

use evalcal_core::evaluation::EvaluationId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("evaluation not found: {0}")]
  NotFound(EvaluationId),

  #[error("{0}")]
  Invalid(#[from] evalcal_core::Error),

  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn backend<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Backend(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
