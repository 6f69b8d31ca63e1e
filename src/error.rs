//! Errors raised by the runtime's own fallible surface.
//!
//! Streams carry their own, user-chosen error type through
//! [`Observer::error`](crate::observer::Observer::error); nothing in here is
//! ever delivered through a stream. `RxError` only covers setting up the
//! ambient machinery, such as building a thread pool for a scheduler.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RxError {
  /// The operating system refused to start the worker threads of a pool.
  #[error("failed to build thread pool `{name}`")]
  ThreadPool {
    name: String,
    #[source]
    source: std::io::Error,
  },

  /// A pool was configured with zero workers.
  #[error("thread pool `{0}` needs at least one worker")]
  EmptyPool(String),
}

pub type Result<T, E = RxError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use std::error::Error as _;

  use super::*;

  #[rxcore_macro::test]
  fn messages_name_the_pool() {
    let err = RxError::EmptyPool("io".into());
    assert_eq!(err.to_string(), "thread pool `io` needs at least one worker");

    let err = RxError::ThreadPool {
      name: "cpu".into(),
      source: std::io::Error::other("no threads"),
    };
    assert_eq!(err.to_string(), "failed to build thread pool `cpu`");
    assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("no threads"));
  }
}
