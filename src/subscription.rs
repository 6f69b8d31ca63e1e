//! Subscriptions: composable, idempotent cancellation handles.
//!
//! A [`Subscription`] is a node in a cancellation tree. Parents own their
//! children through the only strong edge in the tree; children never point
//! back at their parents, so removal from a parent is by identity.

use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
  },
};

use smallvec::SmallVec;
use tracing::trace;

use crate::rc::lock;

/// The handle contract shared by everything that can be cancelled.
pub trait Disposable {
  /// Cancels the underlying work. Calling it more than once is a no-op.
  fn dispose(&self);

  fn is_disposed(&self) -> bool;
}

type Teardown = Box<dyn FnOnce() + Send>;

struct Node {
  disposed: AtomicBool,
  inner: Mutex<NodeInner>,
}

struct NodeInner {
  teardown: Option<Teardown>,
  children: SmallVec<[Subscription; 1]>,
}

impl Node {
  fn new(teardown: Option<Teardown>) -> Self {
    Node {
      disposed: AtomicBool::new(false),
      inner: Mutex::new(NodeInner { teardown, children: SmallVec::new() }),
    }
  }
}

/// Shared handle to one node of a cancellation tree.
///
/// Cloning is cheap and every clone refers to the same node. Disposing a
/// node disposes its teardown action and all of its children exactly once,
/// no matter how many clones or threads call [`dispose`](Disposable::dispose).
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let group = Subscription::new();
/// let child = Subscription::from_fn(|| println!("released"));
/// group.add(child.clone());
///
/// group.dispose();
/// assert!(child.is_disposed());
///
/// // Anything added to a disposed group is released right away.
/// let late = Subscription::new();
/// group.add(late.clone());
/// assert!(late.is_disposed());
/// ```
#[derive(Clone)]
pub struct Subscription(Option<Arc<Node>>);

impl Default for Subscription {
  fn default() -> Self { Self::new() }
}

impl Subscription {
  /// A fresh, live node with no children.
  pub fn new() -> Self { Subscription(Some(Arc::new(Node::new(None)))) }

  /// A placeholder that is already terminal and owns nothing.
  ///
  /// It reports itself disposed, ignores `dispose`, and disposes anything
  /// added to it immediately.
  #[inline]
  pub fn empty() -> Self { Subscription(None) }

  /// A live node that runs `f` once when disposed.
  pub fn from_fn(f: impl FnOnce() + Send + 'static) -> Self {
    Subscription(Some(Arc::new(Node::new(Some(Box::new(f))))))
  }

  #[inline]
  pub fn is_empty(&self) -> bool { self.0.is_none() }

  /// Attaches `child` to this node.
  ///
  /// If this node is already disposed (or is the empty placeholder) the child
  /// is disposed on the spot instead of being retained. Adding a node to
  /// itself, or adding a child twice, is ignored.
  pub fn add(&self, child: Subscription) {
    let Some(node) = &self.0 else {
      child.dispose();
      return;
    };
    if child.is_empty() || self.is_same(&child) {
      return;
    }
    {
      let mut inner = lock(&node.inner);
      if !node.disposed.load(Ordering::Acquire) {
        inner.children.retain(|c| !c.is_disposed());
        if !inner.children.iter().any(|c| c.is_same(&child)) {
          inner.children.push(child);
        }
        return;
      }
    }
    child.dispose();
  }

  /// Shorthand for `add(Subscription::from_fn(f))`.
  #[inline]
  pub fn add_teardown(&self, f: impl FnOnce() + Send + 'static) { self.add(Self::from_fn(f)) }

  /// Detaches `child` without disposing it. Returns whether it was found.
  pub fn remove(&self, child: &Subscription) -> bool {
    let Some(node) = &self.0 else { return false };
    let mut inner = lock(&node.inner);
    match inner.children.iter().position(|c| c.is_same(child)) {
      Some(idx) => {
        inner.children.remove(idx);
        true
      }
      None => false,
    }
  }

  /// Disposes the node and reports whether this call performed the
  /// transition. Exactly one caller ever observes `true`.
  pub(crate) fn try_dispose(&self) -> bool {
    let Some(node) = &self.0 else { return false };
    if node.disposed.swap(true, Ordering::AcqRel) {
      return false;
    }
    let (teardown, children) = {
      let mut inner = lock(&node.inner);
      (inner.teardown.take(), std::mem::take(&mut inner.children))
    };
    trace!(children = children.len(), "subscription disposed");
    for child in children {
      child.dispose();
    }
    if let Some(teardown) = teardown {
      teardown();
    }
    true
  }

  /// Identity comparison. Empty placeholders are never the same as anything.
  pub fn is_same(&self, other: &Subscription) -> bool {
    match (&self.0, &other.0) {
      (Some(a), Some(b)) => Arc::ptr_eq(a, b),
      _ => false,
    }
  }

  /// Activates "RAII" behavior for this subscription: the returned guard
  /// disposes it when dropped.
  ///
  /// **Attention:** if the return value is not bound to a variable, the
  /// subscription is disposed immediately.
  pub fn dispose_when_dropped(self) -> SubscriptionGuard<Self> { SubscriptionGuard::new(self) }

  #[cfg(test)]
  pub(crate) fn teardown_size(&self) -> usize {
    self
      .0
      .as_ref()
      .map_or(0, |node| lock(&node.inner).children.len())
  }
}

impl Disposable for Subscription {
  #[inline]
  fn dispose(&self) { self.try_dispose(); }

  #[inline]
  fn is_disposed(&self) -> bool {
    self
      .0
      .as_ref()
      .is_none_or(|node| node.disposed.load(Ordering::Acquire))
  }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("is_empty", &self.is_empty())
      .field("is_disposed", &self.is_disposed())
      .finish()
  }
}

impl<T: Disposable + ?Sized> Disposable for Box<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be disposed.
///
/// If you want to drop it immediately, wrap it in its own scope.
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<T: Disposable>(T);

impl<T: Disposable> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(subscription) }
}

impl<T: Disposable> Disposable for SubscriptionGuard<T> {
  #[inline]
  fn dispose(&self) { self.0.dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.is_disposed() }
}

impl<T: Disposable> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.dispose() }
}
