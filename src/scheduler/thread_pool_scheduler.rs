use std::{num::NonZeroUsize, time::Duration};

use futures::executor::ThreadPool;
use tracing::debug;

use super::{cancellable, Job, Scheduler};
use crate::{
  error::{Result, RxError},
  subscription::Subscription,
};

/// Settings for a [`ThreadPoolScheduler`].
#[derive(Clone, Debug)]
pub struct ThreadPoolConfig {
  /// Number of worker threads. Must be at least one.
  pub pool_size: usize,
  /// Prefix of the worker thread names.
  pub name_prefix: String,
}

impl Default for ThreadPoolConfig {
  fn default() -> Self {
    ThreadPoolConfig {
      pool_size: std::thread::available_parallelism().map_or(4, NonZeroUsize::get),
      name_prefix: "rxcore-pool-".to_string(),
    }
  }
}

/// Runs jobs on a `futures` thread pool.
///
/// Clones share the pool. Delays are awaited inside the pool task, so a
/// delayed job does not occupy a worker while it waits (with the `timer`
/// feature).
#[derive(Clone, Debug)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

impl ThreadPoolScheduler {
  /// A pool sized to the machine's available parallelism.
  pub fn new() -> Result<Self> { Self::with_config(ThreadPoolConfig::default()) }

  pub fn with_config(config: ThreadPoolConfig) -> Result<Self> {
    let ThreadPoolConfig { pool_size, name_prefix } = config;
    if pool_size == 0 {
      return Err(RxError::EmptyPool(name_prefix));
    }
    let pool = ThreadPool::builder()
      .pool_size(pool_size)
      .name_prefix(name_prefix.clone())
      .create()
      .map_err(|source| RxError::ThreadPool { name: name_prefix.clone(), source })?;
    debug!(pool_size, name_prefix = %name_prefix, "thread pool scheduler started");
    Ok(ThreadPoolScheduler { pool })
  }
}

impl Scheduler for ThreadPoolScheduler {
  fn schedule(&self, job: Job, delay: Option<Duration>) -> Subscription {
    let (handle, job) = cancellable(job);
    self.pool.spawn_ok(async move {
      if let Some(delay) = delay {
        sleep(delay).await;
      }
      job();
    });
    handle
  }
}

#[cfg(feature = "timer")]
async fn sleep(delay: Duration) { futures_time::task::sleep(delay.into()).await; }

#[cfg(not(feature = "timer"))]
async fn sleep(delay: Duration) { std::thread::sleep(delay); }
