//! Core types and trait definitions for the evaluation calendar.
//!
//! This crate is deliberately free of runtime and database dependencies.
//! The sync services and every backend depend on it; it depends on nothing
//! proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod backend;
pub mod catalog;
pub mod error;
pub mod evaluation;
pub mod query;
pub mod user;

pub use error::{Error, Result};
