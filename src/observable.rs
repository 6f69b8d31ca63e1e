//! Observable trait, the extension surface, and the built-in sources.

use std::time::Duration;

use crate::{
  observer::{noop, unhandled_error, BoundObserver, FnObserver, Observer},
  ops::{
    merge::MergeOp, merge_all::MergeAllOp, ref_count::RefCount, subscribe_on::SubscribeOnOp,
  },
  scheduler::Scheduler,
  subject::Subject,
  subscription::Subscription,
};

mod boxed;
pub use boxed::*;
mod connectable_observable;
pub use connectable_observable::*;
mod create;
pub use create::*;
mod from_iter;
pub use from_iter::*;
mod trivial;
pub use trivial::*;

pub use crate::ops::merge::{merge_iter, MergeIter};

/// A lazy producer of `next*` followed by at most one of `error` or
/// `complete`.
///
/// Subscribing consumes the value. Sources that may be subscribed more than
/// once, such as the upstream of a [`ConnectableObservable`], implement
/// `Clone` and are cloned per subscription.
///
/// Implementations call [`Observer::set_upstream`] with the subscription they
/// return before emitting anything, and stop emitting once
/// [`Observer::is_disposed`] reports `true`.
pub trait Observable<Item, Err>: Sized {
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static;
}

pub trait ObservableExt<Item, Err>: Observable<Item, Err> {
  /// Subscribes with a `next` handler only. An error that reaches this
  /// observer is logged and otherwise dropped.
  fn subscribe<N>(self, next: N) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    Item: 'static,
    Err: 'static,
  {
    self.actual_subscribe(FnObserver::new(next, unhandled_error::<Err> as fn(Err), noop as fn()))
  }

  fn subscribe_err<N, E>(self, next: N, error: E) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    E: FnOnce(Err) + Send + 'static,
    Item: 'static,
    Err: 'static,
  {
    self.actual_subscribe(FnObserver::new(next, error, noop as fn()))
  }

  fn subscribe_complete<N, C>(self, next: N, complete: C) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    C: FnOnce() + Send + 'static,
    Item: 'static,
    Err: 'static,
  {
    self.actual_subscribe(FnObserver::new(next, unhandled_error::<Err> as fn(Err), complete))
  }

  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> Subscription
  where
    N: FnMut(Item) + Send + 'static,
    E: FnOnce(Err) + Send + 'static,
    C: FnOnce() + Send + 'static,
    Item: 'static,
    Err: 'static,
  {
    self.actual_subscribe(FnObserver::new(next, error, complete))
  }

  /// Subscribes `observer` so that its lifetime is also bounded by `extent`.
  ///
  /// The upstream subscription is attached to `extent`, and disposing
  /// `extent` stops the stream. Returns the upstream subscription.
  fn subscribe_with<O>(self, extent: Subscription, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    self.actual_subscribe(BoundObserver::new(observer, extent))
  }

  /// Interleaves the emissions of `self` and `other`.
  ///
  /// Completes once both have completed; the first error from either is
  /// forwarded and cancels the other.
  ///
  /// ```rust
  /// use std::sync::{Arc, Mutex};
  /// use rxcore::prelude::*;
  ///
  /// let seen = Arc::new(Mutex::new(vec![]));
  /// let c_seen = seen.clone();
  /// observable::from_iter([1, 2])
  ///   .merge(observable::of(3))
  ///   .subscribe(move |v| c_seen.lock().unwrap().push(v));
  ///
  /// assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
  /// ```
  #[inline]
  fn merge<S>(self, other: S) -> MergeOp<Self, S>
  where
    S: Observable<Item, Err>,
  {
    MergeOp::new(self, other)
  }

  /// Flattens a stream of streams by subscribing to every inner stream as it
  /// arrives and interleaving their emissions.
  #[inline]
  fn merge_all(self) -> MergeAllOp<Self, Item> { MergeAllOp::new(self) }

  /// Shares one subscription to `self` through a fresh [`Subject`].
  #[inline]
  fn publish(self) -> ConnectableObservable<Self, Item, Err>
  where
    Item: 'static,
    Err: Send + 'static,
  {
    ConnectableObservable::new(self, Subject::new())
  }

  /// Shares one subscription to `self` through the given `subject`.
  #[inline]
  fn multicast(self, subject: Subject<Item, Err>) -> ConnectableObservable<Self, Item, Err> {
    ConnectableObservable::new(self, subject)
  }

  /// `publish().ref_count()` in one step.
  #[inline]
  fn share(self) -> RefCount<Self, Item, Err>
  where
    Item: 'static,
    Err: Send + 'static,
  {
    self.publish().ref_count()
  }

  /// Performs the subscription to `self` as a job on `scheduler`.
  #[inline]
  fn subscribe_on<Sch: Scheduler>(self, scheduler: Sch) -> SubscribeOnOp<Self, Sch> {
    SubscribeOnOp::new(self, scheduler, None)
  }

  /// Like [`subscribe_on`](ObservableExt::subscribe_on), but the job waits
  /// `delay` before subscribing.
  #[inline]
  fn delay_subscription<Sch: Scheduler>(
    self, delay: Duration, scheduler: Sch,
  ) -> SubscribeOnOp<Self, Sch> {
    SubscribeOnOp::new(self, scheduler, Some(delay))
  }

  /// Erases the source type.
  #[inline]
  fn box_it(self) -> BoxedObservable<Item, Err>
  where
    Self: Send + 'static,
    Item: 'static,
    Err: 'static,
  {
    BoxedObservable::new(self)
  }
}

impl<T, Item, Err> ObservableExt<Item, Err> for T where T: Observable<Item, Err> {}
