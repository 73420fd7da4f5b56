//! [`DocumentStore`] — the canonical evaluation collection with fan-out.
//!
//! The store keeps an in-process mirror of the backend collection, loaded on
//! first use. A mutation is first applied to the backend; only once that has
//! succeeded is the mirror updated and a fresh [`Snapshot`] pushed to every
//! subscriber. Fan-out therefore never fails halfway through a mutation.
//!
//! Every operation first compares the backend's revision with the one the
//! mirror was built from. Writes made through another handle or process
//! cause a reload, and subscribers get the reloaded collection if it differs.
//! [`DocumentStore::poll_backend`] runs that check on a timer.
//!
//! All mutations, and the mirror they touch, sit behind one async gate. Every
//! subscriber observes the same total order of versions.

use std::{
  sync::{Arc, Mutex as SyncMutex, PoisonError, Weak},
  time::Duration,
};

use evalcal_core::{
  backend::DocumentBackend,
  evaluation::{Evaluation, EvaluationId, EvaluationPatch, NewEvaluation},
  query::sort_by_date,
  user::UserId,
};
use serde::{Deserialize, Serialize};
use tokio::{
  sync::{Mutex, MutexGuard},
  task::JoinHandle,
  time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  listeners::{Listeners, Subscription, SubscriptionId},
};

// ─── Public types ────────────────────────────────────────────────────────────

/// A full, independent copy of the collection at one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
  /// Starts at 0 for the loaded collection and increases by one per
  /// effective mutation.
  pub version:     u64,
  /// Sorted by date ascending; records on the same date keep insertion order.
  pub evaluations: Vec<Evaluation>,
}

impl Snapshot {
  pub fn get(&self, id: &EvaluationId) -> Option<&Evaluation> {
    self.evaluations.iter().find(|e| &e.id == id)
  }

  pub fn len(&self) -> usize { self.evaluations.len() }

  pub fn is_empty(&self) -> bool { self.evaluations.is_empty() }
}

/// What `update` and `delete` do when the id is not in the collection.
///
/// Under both policies the collection is left untouched and no notification
/// is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
  /// Resolve successfully as if the call had happened.
  #[default]
  Ignore,
  /// Fail with [`Error::NotFound`].
  Reject,
}

// ─── Internals ───────────────────────────────────────────────────────────────

struct Collection {
  version:     u64,
  /// Backend revision the mirror matches. `None` forces a reload.
  revision:    Option<u64>,
  /// Insertion order, as the backend reports it.
  evaluations: Vec<Evaluation>,
}

impl Collection {
  fn snapshot(&self) -> Snapshot {
    let mut evaluations = self.evaluations.clone();
    sort_by_date(&mut evaluations);
    Snapshot { version: self.version, evaluations }
  }

  fn position(&self, id: &EvaluationId) -> Option<usize> {
    self.evaluations.iter().position(|e| &e.id == id)
  }
}

struct Inner<B> {
  backend:   B,
  policy:    MissingPolicy,
  /// `None` until the first operation loads the backend collection.
  gate:      Mutex<Option<Collection>>,
  listeners: Arc<Listeners<Snapshot>>,
  /// Subscribers whose initial snapshot could not be loaded yet.
  pending:   SyncMutex<Vec<SubscriptionId>>,
}

impl<B: DocumentBackend> Inner<B> {
  /// Take the gate with the mirror in step with the backend.
  async fn acquire(&self) -> Result<MutexGuard<'_, Option<Collection>>> {
    let mut gate = self.gate.lock().await;
    self.sync(&mut gate).await?;
    Ok(gate)
  }

  /// Load the collection on first use, or reload it if the backend revision
  /// moved. A reload that changes the collection is published. Pending
  /// initial deliveries go out once the mirror is available.
  async fn sync(&self, gate: &mut Option<Collection>) -> Result<()> {
    let revision = self.backend.revision().await.map_err(Error::backend)?;
    let current = gate.as_ref().is_some_and(|c| c.revision == Some(revision));

    if !current {
      let evaluations = self.backend.list_evaluations().await.map_err(Error::backend)?;
      match gate.as_mut() {
        None => {
          debug!(count = evaluations.len(), revision, "collection loaded");
          *gate = Some(Collection { version: 0, revision: Some(revision), evaluations });
        }
        Some(collection) => {
          collection.revision = Some(revision);
          if collection.evaluations != evaluations {
            info!(count = evaluations.len(), revision, "collection changed in the backend");
            collection.evaluations = evaluations;
            self.publish(collection);
          }
        }
      }
    }

    self.flush_pending(loaded(gate));
    Ok(())
  }

  /// Record the revision produced by this store's own write. If anything
  /// else wrote in between, the next sync reloads.
  async fn wrote(&self, collection: &mut Collection) {
    let expected = collection.revision.map(|r| r + 1);
    collection.revision = match self.backend.revision().await {
      Ok(revision) if Some(revision) == expected => Some(revision),
      Ok(_) => None,
      Err(e) => {
        warn!(error = %e, "revision unavailable after write; will reload");
        None
      }
    };
  }

  fn flush_pending(&self, collection: &Collection) {
    let waiting = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
    if waiting.is_empty() {
      return;
    }
    let snapshot = collection.snapshot();
    for id in waiting {
      if self.listeners.deliver(id, snapshot.version, snapshot.clone()) {
        debug!(%id, version = snapshot.version, "late initial snapshot delivered");
      }
    }
  }

  /// Bump the version and push a snapshot to every live subscriber.
  fn publish(&self, collection: &mut Collection) {
    collection.version += 1;
    let snapshot = collection.snapshot();
    let notified = self.listeners.notify(snapshot.version, &snapshot);
    debug!(version = snapshot.version, notified, "collection published");
  }

  fn missing(&self, id: &EvaluationId) -> Result<()> {
    match self.policy {
      MissingPolicy::Ignore => {
        debug!(%id, "ignoring mutation of unknown evaluation");
        Ok(())
      }
      MissingPolicy::Reject => Err(Error::NotFound(id.clone())),
    }
  }
}

/// Take the collection out of a guard that [`Inner::sync`] has filled.
fn loaded(gate: &mut Option<Collection>) -> &mut Collection {
  gate.get_or_insert_with(|| Collection { version: 0, revision: None, evaluations: Vec::new() })
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Owns the evaluation collection and notifies subscribers of every change.
///
/// Cloning is cheap and every clone shares the same collection and
/// subscriber set.
pub struct DocumentStore<B> {
  inner: Arc<Inner<B>>,
}

impl<B> Clone for DocumentStore<B> {
  fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

impl<B> DocumentStore<B>
where
  B: DocumentBackend + 'static,
{
  pub fn new(backend: B) -> Self { Self::with_policy(backend, MissingPolicy::default()) }

  pub fn with_policy(backend: B, policy: MissingPolicy) -> Self {
    Self {
      inner: Arc::new(Inner {
        backend,
        policy,
        gate: Mutex::new(None),
        listeners: Arc::new(Listeners::new()),
        pending: SyncMutex::new(Vec::new()),
      }),
    }
  }

  pub fn backend(&self) -> &B { &self.inner.backend }

  pub fn policy(&self) -> MissingPolicy { self.inner.policy }

  /// Number of live subscriptions.
  pub fn subscriber_count(&self) -> usize { self.inner.listeners.len() }

  /// One-shot read of the current collection.
  pub async fn snapshot(&self) -> Result<Snapshot> {
    let mut gate = self.inner.acquire().await?;
    Ok(loaded(&mut gate).snapshot())
  }

  /// Pick up writes made through other handles or processes. Subscribers are
  /// notified if the collection changed.
  pub async fn refresh(&self) -> Result<()> {
    self.inner.acquire().await?;
    Ok(())
  }

  /// Call [`DocumentStore::refresh`] every `every` until the last clone of
  /// this store is dropped or the returned task is aborted.
  pub fn poll_backend(&self, every: Duration) -> JoinHandle<()> {
    let inner: Weak<Inner<B>> = Arc::downgrade(&self.inner);
    tokio::spawn(async move {
      let mut ticks = tokio::time::interval(every);
      ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        ticks.tick().await;
        let Some(inner) = inner.upgrade() else {
          break;
        };
        if let Err(e) = inner.acquire().await {
          debug!(error = %e, "backend poll failed");
        }
      }
    })
  }

  /// Register for collection changes.
  ///
  /// The callback first receives the full collection on a later scheduler
  /// turn, then a fresh snapshot after every mutation. If a mutation reaches
  /// the subscriber before the initial delivery runs, the now-stale initial
  /// snapshot is skipped. If the backend cannot be read at that point, the
  /// initial snapshot follows the next operation that reads it successfully.
  pub fn subscribe<F>(&self, callback: F) -> Subscription
  where
    F: Fn(Snapshot) + Send + Sync + 'static,
  {
    let id = self.inner.listeners.register(Arc::new(callback));
    debug!(%id, "collection listener attached");

    let inner = Arc::clone(&self.inner);
    tokio::spawn(async move {
      let mut gate = inner.gate.lock().await;
      match inner.sync(&mut gate).await {
        Ok(()) => {
          let snapshot = loaded(&mut gate).snapshot();
          inner.listeners.deliver(id, snapshot.version, snapshot);
        }
        Err(e) => {
          // Queued under the gate, so the next successful sync sees it.
          inner.pending.lock().unwrap_or_else(PoisonError::into_inner).push(id);
          warn!(%id, error = %e, "initial snapshot deferred until the backend answers");
        }
      }
    });

    Subscription::new(id, &self.inner.listeners)
  }

  /// Validate, persist under a fresh id, and notify every subscriber.
  ///
  /// Returns the stored record including its assigned id.
  pub async fn create(&self, input: NewEvaluation, creator_id: UserId) -> Result<Evaluation> {
    let input = input.normalized()?;
    let mut gate = self.inner.acquire().await?;

    let created = self
      .inner
      .backend
      .insert_evaluation(input, creator_id)
      .await
      .map_err(Error::backend)?;
    info!(id = %created.id, creator = %created.creator_id, "evaluation created");

    let collection = loaded(&mut gate);
    collection.evaluations.push(created.clone());
    self.inner.publish(collection);
    self.inner.wrote(collection).await;
    Ok(created)
  }

  /// Merge `patch` into the stored record, keeping its id and creator, and
  /// notify every subscriber.
  ///
  /// An unknown id is handled according to the store's [`MissingPolicy`].
  pub async fn update(&self, id: &EvaluationId, patch: EvaluationPatch) -> Result<()> {
    let mut gate = self.inner.acquire().await?;
    let collection = loaded(&mut gate);

    let Some(index) = collection.position(id) else {
      return self.inner.missing(id);
    };
    let next = collection.evaluations[index].patched(patch)?;

    let found = self
      .inner
      .backend
      .replace_evaluation(next.clone())
      .await
      .map_err(Error::backend)?;
    if !found {
      warn!(%id, "backend had no record to replace; reloading");
      collection.revision = None;
      self.inner.sync(&mut gate).await?;
      return self.inner.missing(id);
    }
    info!(%id, "evaluation updated");

    collection.evaluations[index] = next;
    self.inner.publish(collection);
    self.inner.wrote(collection).await;
    Ok(())
  }

  /// Hard-delete a record and notify every subscriber.
  ///
  /// An unknown id is handled according to the store's [`MissingPolicy`].
  pub async fn delete(&self, id: &EvaluationId) -> Result<()> {
    let mut gate = self.inner.acquire().await?;
    let collection = loaded(&mut gate);

    let Some(index) = collection.position(id) else {
      return self.inner.missing(id);
    };

    let found = self.inner.backend.delete_evaluation(id).await.map_err(Error::backend)?;
    if !found {
      warn!(%id, "backend had no record to delete; reloading");
      collection.revision = None;
      self.inner.sync(&mut gate).await?;
      return self.inner.missing(id);
    }
    info!(%id, "evaluation deleted");

    collection.evaluations.remove(index);
    self.inner.publish(collection);
    self.inner.wrote(collection).await;
    Ok(())
  }
}
