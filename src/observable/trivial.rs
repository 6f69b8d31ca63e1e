use std::{convert::Infallible, marker::PhantomData};

use crate::{
  observable::Observable,
  observer::Observer,
  subscription::{Disposable, Subscription},
};

/// Creates an observable producing a single value.
///
/// Completes immediately after emitting the value given. Never emits an
/// error.
pub fn of<Item>(v: Item) -> ObservableOf<Item> { ObservableOf(v) }

#[derive(Clone)]
pub struct ObservableOf<Item>(Item);

impl<Item> Observable<Item, Infallible> for ObservableOf<Item> {
  fn actual_subscribe<O>(self, mut observer: O) -> Subscription
  where
    O: Observer<Item, Infallible> + Send + 'static,
  {
    let subscription = Subscription::new();
    observer.set_upstream(subscription.clone());
    if !observer.is_disposed() {
      observer.next(self.0);
    }
    if !observer.is_disposed() {
      observer.complete();
    }
    subscription.dispose();
    subscription
  }
}

/// Creates an observable that produces no values and completes immediately.
pub fn empty<Item>() -> ObservableEmpty<Item> { ObservableEmpty(PhantomData) }

pub struct ObservableEmpty<Item>(PhantomData<fn() -> Item>);

impl<Item> Clone for ObservableEmpty<Item> {
  fn clone(&self) -> Self { ObservableEmpty(PhantomData) }
}

impl<Item> Observable<Item, Infallible> for ObservableEmpty<Item> {
  fn actual_subscribe<O>(self, mut observer: O) -> Subscription
  where
    O: Observer<Item, Infallible> + Send + 'static,
  {
    let subscription = Subscription::new();
    observer.set_upstream(subscription.clone());
    if !observer.is_disposed() {
      observer.complete();
    }
    subscription.dispose();
    subscription
  }
}

/// Creates an observable that never emits anything, not even a terminal
/// signal. Only disposing the returned subscription ends it.
pub fn never<Item>() -> ObservableNever<Item> { ObservableNever(PhantomData) }

pub struct ObservableNever<Item>(PhantomData<fn() -> Item>);

impl<Item> Clone for ObservableNever<Item> {
  fn clone(&self) -> Self { ObservableNever(PhantomData) }
}

impl<Item> Observable<Item, Infallible> for ObservableNever<Item> {
  fn actual_subscribe<O>(self, mut observer: O) -> Subscription
  where
    O: Observer<Item, Infallible> + Send + 'static,
  {
    let subscription = Subscription::new();
    observer.set_upstream(subscription.clone());
    subscription
  }
}

/// Creates an observable that emits no items, just terminates with an error.
///
/// # Arguments
///
/// * `e` - An error to emit and terminate with
pub fn throw_err<Item, Err>(e: Err) -> ObservableThrow<Item, Err> {
  ObservableThrow(e, PhantomData)
}

pub struct ObservableThrow<Item, Err>(Err, PhantomData<fn() -> Item>);

impl<Item, Err: Clone> Clone for ObservableThrow<Item, Err> {
  fn clone(&self) -> Self { ObservableThrow(self.0.clone(), PhantomData) }
}

impl<Item, Err> Observable<Item, Err> for ObservableThrow<Item, Err> {
  fn actual_subscribe<O>(self, mut observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let subscription = Subscription::new();
    observer.set_upstream(subscription.clone());
    if !observer.is_disposed() {
      observer.error(self.0);
    }
    subscription.dispose();
    subscription
  }
}
