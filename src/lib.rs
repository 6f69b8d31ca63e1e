//! # rxcore: a reactive-stream runtime
//!
//! A source ([`Observable`]) emits values followed by at most one terminal
//! signal to consumers ([`Observer`]). Every piece of in-flight work is
//! represented by a [`Subscription`], a composable and idempotent
//! cancellation handle, so tearing down a pipeline is one `dispose` call.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use rxcore::prelude::*;
//!
//! let seen = Arc::new(Mutex::new(vec![]));
//! let c_seen = seen.clone();
//! observable::from_iter(0..3)
//!   .merge(observable::of(10))
//!   .subscribe(move |v| c_seen.lock().unwrap().push(v));
//!
//! assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 10]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazy producer, subscribed with `actual_subscribe` |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`DynamicObserver`] | A clonable, type-erased observer |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Subject`] | Hot multicast source that is also an observer |
//! | [`CurrentThread`] | Trampoline queue that turns reentrant scheduling into iteration |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `ThreadPoolScheduler` on a `futures`
//!   thread pool
//! - **`timer`** (default): non-blocking delays for the thread pool via
//!   `futures-time`
//! - **`tokio-scheduler`**: `TokioScheduler` on a tokio runtime handle
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`DynamicObserver`]: observer::DynamicObserver
//! [`Subscription`]: subscription::Subscription
//! [`Subject`]: subject::Subject
//! [`CurrentThread`]: scheduler::CurrentThread

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;
