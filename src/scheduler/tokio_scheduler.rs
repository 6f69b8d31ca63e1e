use std::time::Duration;

use tokio::runtime::Handle;

use super::{cancellable, Job, Scheduler};
use crate::subscription::Subscription;

/// Runs jobs on the blocking pool of a tokio runtime.
///
/// Jobs are synchronous observer code, so they go through `spawn_blocking`
/// rather than occupying the runtime's async workers. A delay is awaited on
/// the runtime's timer first, and disposing the handle while the delay is
/// pending aborts the timer task.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
  handle: Handle,
}

impl TokioScheduler {
  pub fn new(handle: Handle) -> Self { TokioScheduler { handle } }

  /// The scheduler for the runtime the caller runs on, if any.
  pub fn try_current() -> Option<Self> { Handle::try_current().ok().map(Self::new) }
}

impl Scheduler for TokioScheduler {
  fn schedule(&self, job: Job, delay: Option<Duration>) -> Subscription {
    let (handle, job) = cancellable(job);
    match delay {
      None => {
        self.handle.spawn_blocking(job);
      }
      Some(delay) => {
        let timer = self.handle.spawn(async move {
          tokio::time::sleep(delay).await;
          tokio::task::spawn_blocking(job);
        });
        handle.add_teardown(move || timer.abort());
      }
    }
    handle
  }
}
