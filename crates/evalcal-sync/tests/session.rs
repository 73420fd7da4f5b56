//! Auth session behaviour against the mock backend.

use evalcal_core::user::{AuthenticatedUser, UserId};
use evalcal_store_memory::{
  DEMO_TEACHER_EMAIL, DEMO_TEACHER_PASSWORD, DEMO_TEACHER_UID, MemoryBackend,
};
use evalcal_sync::{AuthSession, Error};
use tokio::sync::mpsc::{self, UnboundedReceiver};

type AuthState = Option<AuthenticatedUser>;

fn recorder() -> (impl Fn(AuthState) + Send + Sync + 'static, UnboundedReceiver<AuthState>) {
  let (tx, rx) = mpsc::unbounded_channel();
  (
    move |state| {
      let _ = tx.send(state);
    },
    rx,
  )
}

fn session() -> AuthSession<MemoryBackend> { AuthSession::new(MemoryBackend::seeded()) }

#[tokio::test]
async fn initial_state_arrives_on_a_later_turn() {
  let auth = session();
  let (callback, mut rx) = recorder();
  let _sub = auth.subscribe(callback);

  assert!(rx.try_recv().is_err(), "initial state must not be delivered inline");
  assert_eq!(rx.recv().await, Some(None));
}

#[tokio::test]
async fn demo_teacher_sign_in_notifies_before_resolving() {
  let auth = session();
  let (callback, mut rx) = recorder();
  let _sub = auth.subscribe(callback);
  assert_eq!(rx.recv().await, Some(None));

  let user = auth.sign_in(DEMO_TEACHER_EMAIL, DEMO_TEACHER_PASSWORD).await.unwrap();
  assert_eq!(user.uid, UserId::new(DEMO_TEACHER_UID));
  assert_eq!(user.email.as_deref(), Some(DEMO_TEACHER_EMAIL));

  assert_eq!(rx.try_recv().unwrap(), Some(user.clone()));
  assert_eq!(auth.current_user().await, Some(user));
}

#[tokio::test]
async fn wrong_password_is_rejected_without_notification() {
  let auth = session();
  let (callback, mut rx) = recorder();
  let _sub = auth.subscribe(callback);
  assert_eq!(rx.recv().await, Some(None));

  let err = auth.sign_in(DEMO_TEACHER_EMAIL, "not-the-password").await.unwrap_err();
  assert!(matches!(err, Error::InvalidCredentials));
  assert!(rx.try_recv().is_err());
  assert_eq!(auth.current_user().await, None);
}

#[tokio::test]
async fn failed_sign_in_keeps_existing_session() {
  let auth = session();
  auth.sign_in(DEMO_TEACHER_EMAIL, DEMO_TEACHER_PASSWORD).await.unwrap();

  assert!(matches!(
    auth.sign_in("nobody@lir.cl", "password123").await,
    Err(Error::InvalidCredentials)
  ));
  let current = auth.current_user().await.unwrap();
  assert_eq!(current.uid, UserId::new(DEMO_TEACHER_UID));
}

#[tokio::test]
async fn sign_out_notifies_every_listener_with_none() {
  let auth = session();
  let (first, mut rx1) = recorder();
  let (second, mut rx2) = recorder();
  let _a = auth.subscribe(first);
  let _b = auth.subscribe(second);
  assert_eq!(rx1.recv().await, Some(None));
  assert_eq!(rx2.recv().await, Some(None));

  auth.sign_in(DEMO_TEACHER_EMAIL, DEMO_TEACHER_PASSWORD).await.unwrap();
  auth.sign_out().await.unwrap();

  for rx in [&mut rx1, &mut rx2] {
    assert!(rx.try_recv().unwrap().is_some());
    assert_eq!(rx.try_recv().unwrap(), None);
  }
  assert_eq!(auth.current_user().await, None);
}

#[tokio::test]
async fn sign_out_while_signed_out_succeeds() {
  let auth = session();
  auth.sign_out().await.unwrap();
  assert_eq!(auth.current_user().await, None);
}

#[tokio::test]
async fn second_sign_in_replaces_the_user() {
  let backend = MemoryBackend::seeded().with_account(
    UserId::new("second-uid"),
    "jefa@lir.cl",
    "clave",
  );
  let auth = AuthSession::new(backend);
  let (callback, mut rx) = recorder();
  let _sub = auth.subscribe(callback);
  assert_eq!(rx.recv().await, Some(None));

  auth.sign_in(DEMO_TEACHER_EMAIL, DEMO_TEACHER_PASSWORD).await.unwrap();
  auth.sign_in("jefa@lir.cl", "clave").await.unwrap();

  assert_eq!(rx.try_recv().unwrap().unwrap().uid, UserId::new(DEMO_TEACHER_UID));
  assert_eq!(rx.try_recv().unwrap().unwrap().uid, UserId::new("second-uid"));
  assert_eq!(auth.current_user().await.unwrap().uid, UserId::new("second-uid"));
}

#[tokio::test]
async fn late_subscriber_sees_current_user() {
  let auth = session();
  let user = auth.sign_in(DEMO_TEACHER_EMAIL, DEMO_TEACHER_PASSWORD).await.unwrap();

  let (callback, mut rx) = recorder();
  let _sub = auth.subscribe(callback);
  assert_eq!(rx.recv().await, Some(Some(user)));
}

#[tokio::test]
async fn unsubscribed_listener_hears_nothing_more() {
  let auth = session();
  let (callback, mut rx) = recorder();
  let sub = auth.subscribe(callback);
  assert_eq!(rx.recv().await, Some(None));

  sub.unsubscribe();
  sub.unsubscribe();
  auth.sign_in(DEMO_TEACHER_EMAIL, DEMO_TEACHER_PASSWORD).await.unwrap();

  // The sender was dropped along with the registration.
  assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn backend_outage_propagates_as_backend_error() {
  let backend = MemoryBackend::seeded();
  let auth = AuthSession::new(backend.clone());
  backend.set_available(false);

  assert!(matches!(
    auth.sign_in(DEMO_TEACHER_EMAIL, DEMO_TEACHER_PASSWORD).await,
    Err(Error::Backend(_))
  ));
  assert_eq!(auth.current_user().await, None);
}

#[tokio::test]
async fn sign_out_clears_the_session_even_when_the_backend_fails() {
  let backend = MemoryBackend::seeded();
  let auth = AuthSession::new(backend.clone());
  let (callback, mut rx) = recorder();
  let _sub = auth.subscribe(callback);
  assert_eq!(rx.recv().await, Some(None));

  auth.sign_in(DEMO_TEACHER_EMAIL, DEMO_TEACHER_PASSWORD).await.unwrap();
  assert!(matches!(rx.try_recv(), Ok(Some(_))));

  backend.set_available(false);
  assert!(matches!(auth.sign_out().await, Err(Error::Backend(_))));
  assert_eq!(rx.try_recv(), Ok(None));
  assert_eq!(auth.current_user().await, None);
}
