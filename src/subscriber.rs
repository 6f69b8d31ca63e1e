use crate::{
  observer::{DynamicObserver, Observer},
  subscription::{Disposable, Subscription},
};

/// The emitter handed to a [`create`](crate::observable::create) body.
///
/// A `Subscriber` pairs the downstream observer with the subscription that
/// represents this one subscribe call. It is `Clone + Send`, so the body may
/// move it onto other threads or into timers. Once a terminal signal has been
/// forwarded, or the subscription has been disposed from outside, every
/// further signal is dropped.
pub struct Subscriber<Item, Err> {
  observer: DynamicObserver<Item, Err>,
  subscription: Subscription,
}

impl<Item, Err> Clone for Subscriber<Item, Err> {
  fn clone(&self) -> Self {
    Subscriber { observer: self.observer.clone(), subscription: self.subscription.clone() }
  }
}

impl<Item, Err> Subscriber<Item, Err> {
  pub(crate) fn new(mut observer: DynamicObserver<Item, Err>) -> Self {
    let subscription = Subscription::new();
    observer.set_upstream(subscription.clone());
    Subscriber { observer, subscription }
  }

  #[inline]
  pub fn next(&mut self, value: Item) {
    if !self.is_disposed() {
      self.observer.next(value);
    }
  }

  /// Forwards `err` unless a terminal already won, then releases the
  /// subscription.
  pub fn error(&mut self, err: Err) {
    if self.is_disposed() {
      return;
    }
    if self.subscription.try_dispose() {
      self.observer.error(err);
    }
  }

  pub fn complete(&mut self) {
    if self.is_disposed() {
      return;
    }
    if self.subscription.try_dispose() {
      self.observer.complete();
    }
  }

  /// Whether emissions are still wanted.
  pub fn is_disposed(&self) -> bool {
    self.subscription.is_disposed() || self.observer.is_disposed()
  }

  /// The subscription of this subscribe call. Attach resources to it to have
  /// them released on dispose.
  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.subscription }
}

impl<Item, Err> Observer<Item, Err> for Subscriber<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { Subscriber::next(self, value) }

  #[inline]
  fn error(&mut self, err: Err) { Subscriber::error(self, err) }

  #[inline]
  fn complete(&mut self) { Subscriber::complete(self) }

  #[inline]
  fn set_upstream(&mut self, upstream: Subscription) { self.subscription.add(upstream) }

  #[inline]
  fn is_disposed(&self) -> bool { Subscriber::is_disposed(self) }
}
