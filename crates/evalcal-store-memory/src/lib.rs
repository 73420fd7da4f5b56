//! In-memory mock backend.
//!
//! Simulates the hosted auth and document services so the calendar can run
//! without any external project: one demo teacher account, three demo
//! evaluations, and an optional artificial latency on every call.

mod seed;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use seed::{DEMO_TEACHER_EMAIL, DEMO_TEACHER_PASSWORD, DEMO_TEACHER_UID};
pub use store::MemoryBackend;
