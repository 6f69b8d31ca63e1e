//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

pub use crate::{
  error::RxError,
  observable::{
    self, BoxedObservable, ConnectableObservable, Observable, ObservableExt,
  },
  observer::{DynamicObserver, FnObserver, Observer},
  ops::{merge::MergeOp, merge_all::MergeAllOp, ref_count::RefCount, subscribe_on::SubscribeOnOp},
  scheduler::{CurrentThread, Job, NewThread, QueueOwner, Scheduler},
  subject::Subject,
  subscriber::Subscriber,
  subscription::{Disposable, Subscription, SubscriptionGuard},
};
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::{ThreadPoolConfig, ThreadPoolScheduler};
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
