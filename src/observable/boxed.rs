use std::fmt::{Debug, Formatter};

use crate::{
  observable::Observable,
  observer::{DynamicObserver, Observer},
  subscription::Subscription,
};

/// Object-safe view of an observable that subscribes through a
/// [`DynamicObserver`].
trait DynObservable<Item, Err>: Send {
  fn dyn_subscribe(self: Box<Self>, observer: DynamicObserver<Item, Err>) -> Subscription;
}

impl<T, Item, Err> DynObservable<Item, Err> for T
where
  T: Observable<Item, Err> + Send,
  Item: 'static,
  Err: 'static,
{
  #[inline]
  fn dyn_subscribe(self: Box<Self>, observer: DynamicObserver<Item, Err>) -> Subscription {
    (*self).actual_subscribe(observer)
  }
}

/// An observable with its concrete type erased.
///
/// Useful for storing sources of different types in one collection, for
/// example to pass them to [`merge_iter`](crate::observable::merge_iter).
pub struct BoxedObservable<Item, Err>(Box<dyn DynObservable<Item, Err>>);

impl<Item, Err> BoxedObservable<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: Observable<Item, Err> + Send + 'static,
    Item: 'static,
    Err: 'static,
  {
    BoxedObservable(Box::new(source))
  }
}

impl<Item, Err> Observable<Item, Err> for BoxedObservable<Item, Err> {
  #[inline]
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    self.0.dyn_subscribe(observer.into_dynamic())
  }
}

impl<Item, Err> Debug for BoxedObservable<Item, Err> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str("BoxedObservable") }
}
