//! Schedulers decide where and when a unit of work runs.
//!
//! - [`CurrentThread`] runs work on the calling thread, queueing anything
//!   scheduled while a job is already running so that recursion turns into
//!   iteration.
//! - [`NewThread`] spawns a dedicated OS thread per job.
//! - `ThreadPoolScheduler` (feature `futures-scheduler`) runs jobs on a
//!   `futures` thread pool.
//! - `TokioScheduler` (feature `tokio-scheduler`) runs jobs on the blocking
//!   pool of a tokio runtime.

use std::time::Duration;

use crate::subscription::{Disposable, Subscription};

mod current_thread;
pub use current_thread::{CurrentThread, QueueOwner};
mod thread_scheduler;
pub use thread_scheduler::NewThread;
#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::{ThreadPoolConfig, ThreadPoolScheduler};
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;

/// A unit of work handed to a scheduler.
pub type Job = Box<dyn FnOnce() + Send>;

/// A Scheduler is an object to order jobs and schedule their execution.
pub trait Scheduler: Clone + Send + 'static {
  /// Runs `job` after `delay` (or as soon as possible when `None`).
  ///
  /// Disposing the returned subscription before the job starts cancels it.
  /// Once the job has run, the subscription is disposed.
  fn schedule(&self, job: Job, delay: Option<Duration>) -> Subscription;
}

/// Wraps `job` so it is skipped if the returned handle is disposed first.
pub(crate) fn cancellable(job: Job) -> (Subscription, Job) {
  let handle = Subscription::new();
  let c_handle = handle.clone();
  let job = Box::new(move || {
    if !c_handle.is_disposed() {
      job();
      c_handle.dispose();
    }
  });
  (handle, job)
}
