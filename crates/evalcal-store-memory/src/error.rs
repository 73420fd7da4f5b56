//! Error type for `evalcal-store-memory`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The backend has been switched offline with
  /// [`MemoryBackend::set_available`](crate::MemoryBackend::set_available).
  #[error("backend unavailable")]
  Unavailable,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
