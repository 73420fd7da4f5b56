use std::time::Duration;

use super::{Backend, Services, list::print_table};

/// Print the collection, then a fresh copy whenever it changes, until Ctrl-C.
///
/// Writes from other processes are picked up by checking the backend every
/// `poll`.
pub async fn run<B: Backend>(services: &Services<B>, poll: Duration) -> anyhow::Result<()> {
  let subscription = services.store.subscribe(|snapshot| {
    println!("── version {} · {} evaluations ──", snapshot.version, snapshot.len());
    print_table(&snapshot.evaluations);
  });
  let poller = services.store.poll_backend(poll);
  tracing::info!(id = %subscription.id(), ?poll, "watching; press Ctrl-C to stop");

  tokio::signal::ctrl_c().await?;
  poller.abort();
  subscription.unsubscribe();
  Ok(())
}
