//! Reactive sync layer for the evaluation calendar.
//!
//! Two services sit between any view layer and a swappable backend:
//!
//! - [`AuthSession`] owns "who is signed in" and pushes every change to its
//!   listeners.
//! - [`DocumentStore`] owns the evaluation collection and fans a full
//!   [`Snapshot`] out to every subscriber after each mutation.
//!
//! Consumers never poll. They subscribe once and keep the returned
//! [`Subscription`] for as long as they want updates.
//!
//! Both services spawn their initial deliveries onto the ambient tokio
//! runtime, so `subscribe` must be called from within one.

pub mod error;
pub mod listeners;
pub mod session;
pub mod store;

pub use error::{Error, Result};
pub use listeners::{Subscription, SubscriptionId};
pub use session::AuthSession;
pub use store::{DocumentStore, MissingPolicy, Snapshot};
