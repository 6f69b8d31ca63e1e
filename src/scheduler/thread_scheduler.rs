use std::{thread, time::Duration};

use tracing::trace;

use super::{cancellable, Job, Scheduler};
use crate::subscription::Subscription;

/// Runs every job on a freshly spawned OS thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct NewThread;

impl Scheduler for NewThread {
  fn schedule(&self, job: Job, delay: Option<Duration>) -> Subscription {
    let (handle, job) = cancellable(job);
    thread::spawn(move || {
      if let Some(delay) = delay {
        thread::sleep(delay);
      }
      trace!("new-thread job started");
      job();
    });
    handle
  }
}
