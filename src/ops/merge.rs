//! The merge family: `merge`, `merge_iter` and (in `merge_all`) the
//! flattening form all funnel into one shared [`MergeState`].

use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc, Mutex,
};

use tracing::debug;

use crate::{
  observable::Observable,
  observer::{DynamicObserver, Observer},
  rc::lock,
  scheduler::CurrentThread,
  subscription::{Disposable, Subscription},
};

/// State shared by every producer of one merge subscription.
///
/// The mutex serializes calls into the downstream observer, so it never
/// sees overlapping signals even when producers run on different threads.
/// `pending` counts producers that have not completed: the driver (the outer
/// stream or the list) counts as one, and every inner subscription adds one.
/// `group` owns every upstream subscription; disposing it cancels them all.
pub(crate) struct MergeState<Item, Err> {
  downstream: Mutex<DynamicObserver<Item, Err>>,
  pending: AtomicUsize,
  group: Subscription,
}

impl<Item, Err> MergeState<Item, Err> {
  pub(crate) fn new(mut downstream: DynamicObserver<Item, Err>) -> Arc<Self> {
    let group = Subscription::new();
    downstream.set_upstream(group.clone());
    Arc::new(MergeState { downstream: Mutex::new(downstream), pending: AtomicUsize::new(1), group })
  }

  #[inline]
  pub(crate) fn subscription(&self) -> Subscription { self.group.clone() }

  /// Producers consult this without touching the downstream lock.
  #[inline]
  pub(crate) fn is_disposed(&self) -> bool { self.group.is_disposed() }

  #[inline]
  pub(crate) fn add_upstream(&self, upstream: Subscription) { self.group.add(upstream) }

  pub(crate) fn next(&self, value: Item) {
    let mut downstream = lock(&self.downstream);
    if !self.group.is_disposed() {
      downstream.next(value);
    }
  }

  /// The first error wins: it cancels every sibling before it is forwarded.
  pub(crate) fn error(&self, err: Err) {
    if self.group.try_dispose() {
      debug!("merge forwarding error");
      lock(&self.downstream).error(err);
    }
  }

  /// Only the completion that brings `pending` to zero is forwarded.
  pub(crate) fn complete(&self) {
    if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 && self.group.try_dispose() {
      debug!("merge forwarding completion");
      lock(&self.downstream).complete();
    }
  }
}

impl<Item, Err> MergeState<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  /// Counts `source` as a producer and subscribes to it.
  pub(crate) fn subscribe_inner<S>(self: &Arc<Self>, source: S)
  where
    S: Observable<Item, Err>,
  {
    if self.group.is_disposed() {
      return;
    }
    self.pending.fetch_add(1, Ordering::AcqRel);
    let upstream = source.actual_subscribe(MergeInnerObserver(self.clone()));
    self.add_upstream(upstream);
  }
}

/// Observer for one merged producer.
pub(crate) struct MergeInnerObserver<Item, Err>(Arc<MergeState<Item, Err>>);

impl<Item, Err> Observer<Item, Err> for MergeInnerObserver<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { self.0.next(value) }

  #[inline]
  fn error(&mut self, err: Err) { self.0.error(err) }

  #[inline]
  fn complete(&mut self) { self.0.complete() }

  #[inline]
  fn set_upstream(&mut self, upstream: Subscription) { self.0.add_upstream(upstream) }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.is_disposed() }
}

/// Merges two sources. Created by
/// [`ObservableExt::merge`](crate::observable::ObservableExt::merge).
#[derive(Clone)]
pub struct MergeOp<S1, S2> {
  source1: S1,
  source2: S2,
}

impl<S1, S2> MergeOp<S1, S2> {
  #[inline]
  pub(crate) fn new(source1: S1, source2: S2) -> Self { MergeOp { source1, source2 } }
}

impl<Item, Err, S1, S2> Observable<Item, Err> for MergeOp<S1, S2>
where
  S1: Observable<Item, Err>,
  S2: Observable<Item, Err>,
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let _drain = CurrentThread::own_queue();
    let merge = MergeState::new(observer.into_dynamic());
    merge.subscribe_inner(self.source1);
    merge.subscribe_inner(self.source2);
    merge.complete();
    merge.subscription()
  }
}

/// Merges every observable yielded by `sources`.
///
/// An empty list completes immediately without emitting.
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use rxcore::prelude::*;
///
/// let seen = Arc::new(Mutex::new(vec![]));
/// let c_seen = seen.clone();
/// observable::merge_iter(vec![observable::of(1), observable::of(2)])
///   .subscribe(move |v| c_seen.lock().unwrap().push(v));
///
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
/// ```
pub fn merge_iter<I>(sources: I) -> MergeIter<I::IntoIter>
where
  I: IntoIterator,
{
  MergeIter { sources: sources.into_iter() }
}

#[derive(Clone)]
pub struct MergeIter<I> {
  sources: I,
}

impl<Item, Err, I> Observable<Item, Err> for MergeIter<I>
where
  I: Iterator,
  I::Item: Observable<Item, Err>,
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let _drain = CurrentThread::own_queue();
    let merge = MergeState::new(observer.into_dynamic());
    for source in self.sources {
      merge.subscribe_inner(source);
    }
    merge.complete();
    merge.subscription()
  }
}

#[cfg(test)]
mod tests {
  use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
  };

  use crate::prelude::*;

  type Log = Arc<Mutex<Vec<String>>>;

  fn record<S, Err>(source: S, log: &Log) -> Subscription
  where
    S: Observable<i32, Err>,
    Err: std::fmt::Display + Send + 'static,
  {
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    source.subscribe_all(
      move |v| l1.lock().unwrap().push(format!("next {v}")),
      move |e| l2.lock().unwrap().push(format!("error {e}")),
      move || l3.lock().unwrap().push("complete".to_string()),
    )
  }

  #[rxcore_macro::test]
  fn odd_even_merge() {
    let mut odd: Subject<i32, Infallible> = Subject::new();
    let mut even: Subject<i32, Infallible> = Subject::new();
    let log = Log::default();
    let subscription = record(odd.clone().merge(even.clone()), &log);

    for i in 1..=6 {
      if i % 2 == 0 {
        even.next(i);
      } else {
        odd.next(i);
      }
    }
    odd.complete();
    assert!(!subscription.is_disposed());
    even.complete();

    let expected: Vec<_> = (1..=6)
      .map(|i| format!("next {i}"))
      .chain(["complete".to_string()])
      .collect();
    assert_eq!(*log.lock().unwrap(), expected);
    assert!(subscription.is_disposed());
  }

  #[rxcore_macro::test]
  fn first_error_cancels_siblings() {
    let mut a: Subject<i32, String> = Subject::new();
    let mut b: Subject<i32, String> = Subject::new();
    let log = Log::default();
    record(a.clone().merge(b.clone()), &log);

    a.next(1);
    b.error("boom".to_string());
    a.next(2);
    a.error("late".to_string());
    a.complete();

    assert_eq!(*log.lock().unwrap(), vec!["next 1", "error boom"]);
    assert_eq!(a.observer_count(), 0, "sibling subscription was disposed");
  }

  #[rxcore_macro::test]
  fn merge_iter_of_once_emitters() {
    let log = Log::default();
    record(observable::merge_iter((0..5).map(observable::of)), &log);

    let mut expected: Vec<_> = (0..5).map(|i| format!("next {i}")).collect();
    expected.push("complete".to_string());
    assert_eq!(*log.lock().unwrap(), expected);
  }

  #[rxcore_macro::test]
  fn empty_list_completes_immediately() {
    let log = Log::default();
    let sources: Vec<observable::ObservableOf<i32>> = vec![];
    let subscription = record(observable::merge_iter(sources), &log);
    assert_eq!(*log.lock().unwrap(), vec!["complete"]);
    assert!(subscription.is_disposed());
  }

  #[rxcore_macro::test]
  fn dispose_cancels_every_source() {
    let a: Subject<i32, Infallible> = Subject::new();
    let b: Subject<i32, Infallible> = Subject::new();
    let subscription = a.clone().merge(b.clone()).subscribe(|_| {});
    assert_eq!(a.observer_count(), 1);
    assert_eq!(b.observer_count(), 1);

    subscription.dispose();
    assert_eq!(a.observer_count(), 0);
    assert_eq!(b.observer_count(), 0);
  }

  #[rxcore_macro::test]
  fn reentrant_subscribe_is_deferred_to_the_queue() {
    let log = Log::default();
    let c_log = log.clone();
    let inner = observable::create(move |mut s: Subscriber<i32, Infallible>| {
      let c_log = c_log.clone();
      CurrentThread.schedule(
        Box::new(move || c_log.lock().unwrap().push("queued job".to_string())),
        None,
      );
      s.next(1);
      s.complete();
    });
    record(inner.merge(observable::of(2)), &log);

    assert_eq!(
      *log.lock().unwrap(),
      vec!["next 1", "next 2", "complete", "queued job"],
      "jobs scheduled during subscribe run after merge releases the queue"
    );
  }
}
