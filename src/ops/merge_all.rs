use std::{marker::PhantomData, sync::Arc};

use super::merge::MergeState;
use crate::{
  observable::Observable,
  observer::Observer,
  scheduler::CurrentThread,
  subscription::Subscription,
};

/// Flattens an observable of observables. Created by
/// [`ObservableExt::merge_all`](crate::observable::ObservableExt::merge_all).
///
/// Every inner observable is subscribed as soon as the outer stream emits
/// it. The result completes once the outer stream and every inner stream
/// have completed; the first error from any of them cancels the rest.
pub struct MergeAllOp<S, Inner> {
  source: S,
  _marker: PhantomData<fn() -> Inner>,
}

impl<S, Inner> MergeAllOp<S, Inner> {
  #[inline]
  pub(crate) fn new(source: S) -> Self { MergeAllOp { source, _marker: PhantomData } }
}

impl<S: Clone, Inner> Clone for MergeAllOp<S, Inner> {
  fn clone(&self) -> Self { MergeAllOp::new(self.source.clone()) }
}

impl<Item, Err, S, Inner> Observable<Item, Err> for MergeAllOp<S, Inner>
where
  S: Observable<Inner, Err>,
  Inner: Observable<Item, Err>,
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let _drain = CurrentThread::own_queue();
    let merge = MergeState::new(observer.into_dynamic());
    let upstream = self.source.actual_subscribe(MergeOuterObserver(merge.clone()));
    merge.add_upstream(upstream);
    merge.subscription()
  }
}

/// Observer of the outer stream: each value is a new producer.
struct MergeOuterObserver<Item, Err>(Arc<MergeState<Item, Err>>);

impl<Item, Err, Inner> Observer<Inner, Err> for MergeOuterObserver<Item, Err>
where
  Inner: Observable<Item, Err>,
  Item: 'static,
  Err: 'static,
{
  #[inline]
  fn next(&mut self, inner: Inner) { self.0.subscribe_inner(inner) }

  #[inline]
  fn error(&mut self, err: Err) { self.0.error(err) }

  #[inline]
  fn complete(&mut self) { self.0.complete() }

  #[inline]
  fn set_upstream(&mut self, upstream: Subscription) { self.0.add_upstream(upstream) }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.is_disposed() }
}
