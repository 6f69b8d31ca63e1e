use std::convert::Infallible;

use crate::{
  observable::Observable,
  observer::Observer,
  subscription::{Disposable, Subscription},
};

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error.
/// Emission stops early once the observer is disposed.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_iter(0..10).subscribe(|v| println!("{v},"));
/// ```
pub fn from_iter<Iter>(iter: Iter) -> ObservableIter<Iter>
where
  Iter: IntoIterator,
{
  ObservableIter(iter)
}

#[derive(Clone)]
pub struct ObservableIter<Iter>(Iter);

impl<Iter> Observable<Iter::Item, Infallible> for ObservableIter<Iter>
where
  Iter: IntoIterator,
{
  fn actual_subscribe<O>(self, mut observer: O) -> Subscription
  where
    O: Observer<Iter::Item, Infallible> + Send + 'static,
  {
    let subscription = Subscription::new();
    observer.set_upstream(subscription.clone());
    for v in self.0 {
      if observer.is_disposed() {
        return subscription;
      }
      observer.next(v);
    }
    if !observer.is_disposed() {
      observer.complete();
    }
    subscription.dispose();
    subscription
  }
}
