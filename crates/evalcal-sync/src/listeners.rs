//! Listener registry and the [`Subscription`] handle.
//!
//! Listeners are keyed by an opaque [`SubscriptionId`] assigned at
//! registration, so the same closure may be registered twice and each
//! registration is removed independently.
//!
//! Callbacks always run outside the registry lock. A callback may therefore
//! subscribe or unsubscribe (itself included) while a fan-out is in flight.
//! A callback that panics is logged and skipped; the rest of the fan-out
//! still runs.

use std::{
  collections::BTreeMap,
  fmt,
  panic::{AssertUnwindSafe, catch_unwind},
  sync::{
    Arc, Mutex, MutexGuard, PoisonError, Weak,
    atomic::{AtomicBool, AtomicU64, Ordering},
  },
};

use serde::Serialize;

/// Opaque registration token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "listener-{}", self.0)
  }
}

pub(crate) type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Entry<T> {
  callback:       Callback<T>,
  /// Highest state version this listener has been handed.
  last_delivered: Option<u64>,
}

// ─── Registry ────────────────────────────────────────────────────────────────

pub(crate) struct Listeners<T> {
  next_id: AtomicU64,
  entries: Mutex<BTreeMap<SubscriptionId, Entry<T>>>,
}

impl<T> Listeners<T> {
  pub(crate) fn new() -> Self {
    Self {
      next_id: AtomicU64::new(0),
      entries: Mutex::new(BTreeMap::new()),
    }
  }

  fn lock(&self) -> MutexGuard<'_, BTreeMap<SubscriptionId, Entry<T>>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub(crate) fn register(&self, callback: Callback<T>) -> SubscriptionId {
    let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
    self.lock().insert(id, Entry { callback, last_delivered: None });
    id
  }

  /// Remove a registration. Returns `false` if it was already gone.
  pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
    self.lock().remove(&id).is_some()
  }

  pub(crate) fn len(&self) -> usize { self.lock().len() }

  /// Hand `value` to one listener, unless it is gone or has already seen
  /// `version` or something newer. Returns whether the callback ran to
  /// completion.
  pub(crate) fn deliver(&self, id: SubscriptionId, version: u64, value: T) -> bool {
    let callback = {
      let mut entries = self.lock();
      let Some(entry) = entries.get_mut(&id) else {
        return false;
      };
      if entry.last_delivered.is_some_and(|seen| seen >= version) {
        return false;
      }
      entry.last_delivered = Some(version);
      Arc::clone(&entry.callback)
    };
    if catch_unwind(AssertUnwindSafe(|| callback(value))).is_err() {
      tracing::error!(%id, version, "listener panicked");
      return false;
    }
    true
  }

  /// Sequentially push `value` to every listener registered when the pass
  /// starts. Each listener gets its own clone. Liveness is re-checked right
  /// before each call, so a removal made mid-pass is honoured.
  ///
  /// Returns the number of listeners actually invoked.
  pub(crate) fn notify(&self, version: u64, value: &T) -> usize
  where
    T: Clone,
  {
    let ids: Vec<SubscriptionId> = self.lock().keys().copied().collect();
    ids
      .into_iter()
      .filter(|id| self.deliver(*id, version, value.clone()))
      .count()
  }
}

// ─── Handle ──────────────────────────────────────────────────────────────────

/// Type-erased removal, so one handle type serves every registry.
pub(crate) trait Detach: Send + Sync {
  fn detach(&self, id: SubscriptionId) -> bool;
}

impl<T: Send + 'static> Detach for Listeners<T> {
  fn detach(&self, id: SubscriptionId) -> bool { self.remove(id) }
}

/// Handle to a live registration.
///
/// Call [`Subscription::unsubscribe`] to stop receiving updates; calling it
/// again is a no-op. Dropping the handle unsubscribes as well, so keep it
/// alive for as long as updates are wanted.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
  id:       SubscriptionId,
  registry: Weak<dyn Detach>,
  active:   AtomicBool,
}

impl Subscription {
  pub(crate) fn new<T: Send + 'static>(id: SubscriptionId, registry: &Arc<Listeners<T>>) -> Self {
    let registry: Arc<dyn Detach> = registry.clone();
    Self {
      id,
      registry: Arc::downgrade(&registry),
      active: AtomicBool::new(true),
    }
  }

  pub fn id(&self) -> SubscriptionId { self.id }

  pub fn is_active(&self) -> bool { self.active.load(Ordering::Acquire) }

  /// Deregister. Takes effect for every notification that starts after this
  /// call returns. Idempotent.
  pub fn unsubscribe(&self) {
    if !self.active.swap(false, Ordering::AcqRel) {
      return;
    }
    if let Some(registry) = self.registry.upgrade()
      && registry.detach(self.id)
    {
      tracing::debug!(id = %self.id, "listener detached");
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) { self.unsubscribe(); }
}

impl fmt::Debug for Subscription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Subscription")
      .field("id", &self.id)
      .field("active", &self.is_active())
      .finish()
  }
}
