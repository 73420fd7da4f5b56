//! The backend traits.
//!
//! These are implemented by concrete backends (e.g. `evalcal-store-memory`,
//! `evalcal-store-sqlite`). The sync services in `evalcal-sync` depend on this
//! abstraction, never on a backend's native data shapes.

use std::future::Future;

use crate::{
  evaluation::{Evaluation, EvaluationId, NewEvaluation},
  user::{AuthenticatedUser, UserId},
};

// ─── Auth ────────────────────────────────────────────────────────────────────

/// Credential registry behind the auth session.
///
/// All methods return `Send` futures so backends can be shared across tasks
/// of a multi-threaded tokio runtime.
pub trait AuthBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Check an email/password pair against the registry.
  ///
  /// Returns `Ok(None)` when the pair does not match a known account. `Err` is
  /// reserved for transport or storage failures.
  fn verify_credentials<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Option<AuthenticatedUser>, Self::Error>> + Send + 'a;

  /// Tell the backend the current session is over.
  fn end_session(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// Storage for the evaluation collection.
///
/// Inputs are already validated by the caller. Backends own id assignment and
/// any conversion between [`Evaluation`] and their native representation.
pub trait DocumentBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Opaque change counter for the stored collection.
  ///
  /// Must differ from any earlier reading once the collection has been
  /// changed through any handle or process. A successful write through this
  /// handle advances it by exactly one.
  fn revision(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Every stored evaluation, in insertion order.
  fn list_evaluations(
    &self,
  ) -> impl Future<Output = Result<Vec<Evaluation>, Self::Error>> + Send + '_;

  /// Assign a fresh unique id, persist, and return the stored record.
  fn insert_evaluation(
    &self,
    input: NewEvaluation,
    creator_id: UserId,
  ) -> impl Future<Output = Result<Evaluation, Self::Error>> + Send + '_;

  /// Overwrite the record whose id matches `evaluation.id`.
  ///
  /// Returns `false` if no such record exists. The stored `creator_id` is
  /// never changed.
  fn replace_evaluation(
    &self,
    evaluation: Evaluation,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Hard-delete a record. Returns `false` if no such record exists.
  fn delete_evaluation<'a>(
    &'a self,
    id: &'a EvaluationId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
