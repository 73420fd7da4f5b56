//! [`AuthSession`] — the single authority for "who is signed in".

use std::sync::Arc;

use evalcal_core::{backend::AuthBackend, user::AuthenticatedUser};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  listeners::{Listeners, Subscription},
};

/// What listeners receive: the signed-in user, or `None` when signed out.
pub type AuthState = Option<AuthenticatedUser>;

struct Slot {
  /// Bumped on every transition; lets a late initial delivery be skipped.
  version: u64,
  current: AuthState,
}

struct Inner<B> {
  backend:   B,
  slot:      Mutex<Slot>,
  listeners: Arc<Listeners<AuthState>>,
}

/// Owns the current-user slot of one process.
///
/// State machine: signed out → `sign_in` → signed in → `sign_out` → signed
/// out. Signing in while signed in replaces the user. Transitions are atomic
/// from a listener's point of view.
///
/// Cloning is cheap and every clone shares the same session.
pub struct AuthSession<B> {
  inner: Arc<Inner<B>>,
}

impl<B> Clone for AuthSession<B> {
  fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

impl<B> AuthSession<B>
where
  B: AuthBackend + 'static,
{
  pub fn new(backend: B) -> Self {
    Self {
      inner: Arc::new(Inner {
        backend,
        slot: Mutex::new(Slot { version: 0, current: None }),
        listeners: Arc::new(Listeners::new()),
      }),
    }
  }

  pub fn backend(&self) -> &B { &self.inner.backend }

  /// Check credentials and make the matched account the current user.
  ///
  /// Every listener has been invoked with the new user by the time this
  /// resolves. On [`Error::InvalidCredentials`] nothing changes and nobody is
  /// notified.
  pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthenticatedUser> {
    let mut slot = self.inner.slot.lock().await;

    let user = self
      .inner
      .backend
      .verify_credentials(email, password)
      .await
      .map_err(Error::backend)?;

    let Some(user) = user else {
      warn!(email, "sign-in rejected");
      return Err(Error::InvalidCredentials);
    };

    slot.version += 1;
    slot.current = Some(user.clone());
    let notified = self.inner.listeners.notify(slot.version, &slot.current);
    info!(uid = %user.uid, notified, "signed in");
    Ok(user)
  }

  /// End the session. Always valid, even when already signed out.
  ///
  /// The slot is cleared and listeners are notified even if the backend
  /// fails to end its side of the session; that failure is returned after.
  pub async fn sign_out(&self) -> Result<()> {
    let mut slot = self.inner.slot.lock().await;

    let ended = self.inner.backend.end_session().await;

    slot.version += 1;
    slot.current = None;
    let notified = self.inner.listeners.notify(slot.version, &slot.current);
    info!(notified, "signed out");

    ended.map_err(|e| {
      warn!(error = %e, "backend could not end the session");
      Error::backend(e)
    })
  }

  pub async fn current_user(&self) -> AuthState { self.inner.slot.lock().await.current.clone() }

  /// Register for auth changes.
  ///
  /// The callback first receives the state current at delivery time, on a
  /// later scheduler turn (never inline), then every subsequent transition.
  pub fn subscribe<F>(&self, callback: F) -> Subscription
  where
    F: Fn(AuthState) + Send + Sync + 'static,
  {
    let id = self.inner.listeners.register(Arc::new(callback));
    debug!(%id, "auth listener attached");

    let inner = Arc::clone(&self.inner);
    tokio::spawn(async move {
      let slot = inner.slot.lock().await;
      inner.listeners.deliver(id, slot.version, slot.current.clone());
    });

    Subscription::new(id, &self.inner.listeners)
  }
}
