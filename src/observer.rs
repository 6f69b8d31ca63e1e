//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern:
//! `next` for values, `error` and `complete` for the terminal signal, plus
//! the two lifecycle hooks sources use to cooperate with cancellation.

use tracing::warn;

use crate::subscription::{Disposable, Subscription};

mod dynamic_observer;
pub use dynamic_observer::DynamicObserver;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// An observer is one session: it is active until exactly one of `error`,
/// `complete` or an external dispose ends it. Calling any signal method after
/// that is a contract violation the caller must avoid; sources and
/// combinators consult [`is_disposed`](Observer::is_disposed) to do so.
///
/// The trait is object safe, which is what lets [`DynamicObserver`] erase
/// any implementation behind one vtable.
pub trait Observer<Item, Err> {
  /// Receive the next value, taking ownership of it.
  fn next(&mut self, value: Item);

  /// Receive the next value from a caller that only holds a reference.
  ///
  /// The default clones once and forwards to [`next`](Observer::next).
  /// Observers that can work from a borrow override it to avoid the clone.
  fn next_ref(&mut self, value: &Item)
  where
    Item: Clone,
  {
    self.next(value.clone())
  }

  /// Handle an error from the observable. No more values follow.
  fn error(&mut self, err: Err);

  /// Handle completion of the observable. No more values follow.
  fn complete(&mut self);

  /// Records the subscription that represents the upstream work feeding this
  /// observer. Sources call it once, before the first emission.
  fn set_upstream(&mut self, upstream: Subscription);

  /// Returns `true` once the observer will not accept more signals, either
  /// because it terminated or because its upstream was disposed.
  fn is_disposed(&self) -> bool;

  /// Erases the concrete observer type.
  fn into_dynamic(self) -> DynamicObserver<Item, Err>
  where
    Self: Sized + Send + 'static,
  {
    DynamicObserver::new(self)
  }
}

// ============================================================================
// FnObserver - Closure adapter
// ============================================================================

/// Observer assembled from closures.
///
/// This backs `subscribe`, `subscribe_err`, `subscribe_complete` and
/// `subscribe_all`. The terminal handlers run at most once.
pub struct FnObserver<N, E, C> {
  next: N,
  error: Option<E>,
  complete: Option<C>,
  upstream: Option<Subscription>,
}

impl<N, E, C> FnObserver<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self {
    FnObserver { next, error: Some(error), complete: Some(complete), upstream: None }
  }

  #[inline]
  fn is_stopped(&self) -> bool { self.error.is_none() || self.complete.is_none() }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for FnObserver<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) {
    if !self.is_stopped() {
      (self.next)(value);
    }
  }

  fn error(&mut self, err: Err) {
    if self.complete.take().is_some() {
      if let Some(error) = self.error.take() {
        error(err);
      }
    }
  }

  fn complete(&mut self) {
    if self.error.take().is_some() {
      if let Some(complete) = self.complete.take() {
        complete();
      }
    }
  }

  #[inline]
  fn set_upstream(&mut self, upstream: Subscription) { self.upstream = Some(upstream); }

  fn is_disposed(&self) -> bool {
    self.is_stopped() || self.upstream.as_ref().is_some_and(Disposable::is_disposed)
  }
}

// ============================================================================
// BoundObserver - Observer tied to an external extent
// ============================================================================

/// Forwards to `inner` while tying the upstream to `extent`.
///
/// Upstream subscriptions are attached to `extent` instead of being kept by
/// the observer, so disposing `extent` cancels the whole chain feeding
/// `inner`.
pub(crate) struct BoundObserver<O> {
  inner: O,
  extent: Subscription,
}

impl<O> BoundObserver<O> {
  pub(crate) fn new<Item, Err>(mut inner: O, extent: Subscription) -> Self
  where
    O: Observer<Item, Err>,
  {
    inner.set_upstream(extent.clone());
    BoundObserver { inner, extent }
  }
}

impl<Item, Err, O> Observer<Item, Err> for BoundObserver<O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.inner.next(value) }

  #[inline]
  fn next_ref(&mut self, value: &Item)
  where
    Item: Clone,
  {
    self.inner.next_ref(value)
  }

  #[inline]
  fn error(&mut self, err: Err) { self.inner.error(err) }

  #[inline]
  fn complete(&mut self) { self.inner.complete() }

  #[inline]
  fn set_upstream(&mut self, upstream: Subscription) { self.extent.add(upstream) }

  #[inline]
  fn is_disposed(&self) -> bool { self.extent.is_disposed() || self.inner.is_disposed() }
}

/// Error handler used by observers built without one.
pub(crate) fn unhandled_error<Err>(_: Err) {
  warn!(
    err_type = std::any::type_name::<Err>(),
    "stream error reached an observer without an error handler"
  );
}

pub(crate) fn noop() {}

// ============================================================================
// Tests
// ============================================================================
