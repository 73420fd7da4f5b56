//! SQLite backend for the evaluation calendar.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Implements both backend traits: the
//! `evaluations` table holds the collection and the `teachers` table is the
//! credential registry (argon2 PHC hashes).

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
