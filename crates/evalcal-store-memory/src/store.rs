//! [`MemoryBackend`] — the in-memory implementation of both backend traits.

use std::{
  sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use evalcal_core::{
  backend::{AuthBackend, DocumentBackend},
  evaluation::{Evaluation, EvaluationId, NewEvaluation},
  user::{AuthenticatedUser, UserId},
};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  seed::{DEMO_TEACHER_EMAIL, DEMO_TEACHER_PASSWORD, DEMO_TEACHER_UID, demo_evaluations},
};

struct Account {
  user:     AuthenticatedUser,
  password: String,
}

#[derive(Default)]
struct State {
  accounts:    Vec<Account>,
  evaluations: Vec<Evaluation>,
  /// Bumped on every write that changes `evaluations`.
  revision:    u64,
}

struct Shared {
  latency:   Duration,
  available: AtomicBool,
  state:     Mutex<State>,
}

/// Mock auth + document backend held entirely in memory.
///
/// Cloning is cheap; clones share the same accounts and collection.
#[derive(Clone)]
pub struct MemoryBackend {
  shared: Arc<Shared>,
}

impl Default for MemoryBackend {
  fn default() -> Self { Self::new() }
}

impl MemoryBackend {
  /// An empty backend: no accounts, no evaluations, no latency.
  pub fn new() -> Self { Self::build(Duration::ZERO, State::default()) }

  /// The demo backend: the demo teacher account and the demo evaluations.
  pub fn seeded() -> Self {
    let backend = Self::new().with_account(
      UserId::new(DEMO_TEACHER_UID),
      DEMO_TEACHER_EMAIL,
      DEMO_TEACHER_PASSWORD,
    );
    backend.lock().evaluations = demo_evaluations();
    backend
  }

  fn build(latency: Duration, state: State) -> Self {
    Self {
      shared: Arc::new(Shared {
        latency,
        available: AtomicBool::new(true),
        state: Mutex::new(state),
      }),
    }
  }

  /// Delay every call by `latency`. Must be applied before the backend is
  /// shared: accounts and evaluations are carried over, clones are not.
  pub fn with_latency(self, latency: Duration) -> Self {
    let state = std::mem::take(&mut *self.lock());
    Self::build(latency, state)
  }

  /// Register an account. Passwords are compared verbatim; this backend is
  /// for demos and tests only.
  pub fn with_account(self, uid: UserId, email: &str, password: &str) -> Self {
    self.lock().accounts.push(Account {
      user:     AuthenticatedUser { uid, email: Some(email.to_owned()) },
      password: password.to_owned(),
    });
    self
  }

  /// Simulate an outage: while unavailable every call fails with
  /// [`Error::Unavailable`] and changes nothing.
  pub fn set_available(&self, available: bool) {
    self.shared.available.store(available, Ordering::Release);
  }

  fn lock(&self) -> MutexGuard<'_, State> {
    self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Complete on a later turn, after the configured latency.
  async fn settle(&self) -> Result<()> {
    if self.shared.latency.is_zero() {
      tokio::task::yield_now().await;
    } else {
      tokio::time::sleep(self.shared.latency).await;
    }
    if self.shared.available.load(Ordering::Acquire) {
      Ok(())
    } else {
      Err(Error::Unavailable)
    }
  }
}

// ─── AuthBackend impl ────────────────────────────────────────────────────────

impl AuthBackend for MemoryBackend {
  type Error = Error;

  async fn verify_credentials<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> Result<Option<AuthenticatedUser>> {
    self.settle().await?;
    let state = self.lock();
    let user = state
      .accounts
      .iter()
      .find(|a| a.user.email.as_deref() == Some(email) && a.password == password)
      .map(|a| a.user.clone());
    debug!(email, matched = user.is_some(), "credentials checked");
    Ok(user)
  }

  async fn end_session(&self) -> Result<()> { self.settle().await }
}

// ─── DocumentBackend impl ────────────────────────────────────────────────────

impl DocumentBackend for MemoryBackend {
  type Error = Error;

  async fn revision(&self) -> Result<u64> {
    self.settle().await?;
    Ok(self.lock().revision)
  }

  async fn list_evaluations(&self) -> Result<Vec<Evaluation>> {
    self.settle().await?;
    Ok(self.lock().evaluations.clone())
  }

  async fn insert_evaluation(
    &self,
    input: NewEvaluation,
    creator_id: UserId,
  ) -> Result<Evaluation> {
    self.settle().await?;
    let id = EvaluationId::new(format!("eval-{}", Uuid::new_v4().simple()));
    let evaluation = Evaluation::from_new(id, input, creator_id);
    let mut state = self.lock();
    state.evaluations.push(evaluation.clone());
    state.revision += 1;
    Ok(evaluation)
  }

  async fn replace_evaluation(&self, evaluation: Evaluation) -> Result<bool> {
    self.settle().await?;
    let mut state = self.lock();
    let Some(slot) = state.evaluations.iter_mut().find(|e| e.id == evaluation.id) else {
      return Ok(false);
    };
    let creator_id = slot.creator_id.clone();
    *slot = Evaluation { creator_id, ..evaluation };
    state.revision += 1;
    Ok(true)
  }

  async fn delete_evaluation<'a>(&'a self, id: &'a EvaluationId) -> Result<bool> {
    self.settle().await?;
    let mut state = self.lock();
    let before = state.evaluations.len();
    state.evaluations.retain(|e| &e.id != id);
    let removed = state.evaluations.len() != before;
    if removed {
      state.revision += 1;
    }
    Ok(removed)
  }
}
