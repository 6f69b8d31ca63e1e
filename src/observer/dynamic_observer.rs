use std::fmt::{Debug, Formatter};

use super::Observer;
use crate::{
  rc::{MutArc, RcDerefMut},
  subscription::Subscription,
};

/// A type-erased observer.
///
/// Wraps any `Observer<Item, Err> + Send` behind one dispatch table so
/// heterogeneous observers can be stored in one collection or handed to
/// combinators without growing their type. Clones share the same underlying
/// observer; the last clone dropped releases it.
///
/// Every call takes the inner lock, so the wrapped observer sees its signals
/// one at a time. An observer that synchronously signals a `DynamicObserver`
/// wrapping itself deadlocks.
pub struct DynamicObserver<Item, Err>(MutArc<Box<dyn Observer<Item, Err> + Send>>);

impl<Item, Err> DynamicObserver<Item, Err> {
  pub fn new<O>(observer: O) -> Self
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    DynamicObserver(MutArc::own(Box::new(observer)))
  }

  /// Whether both handles share the same underlying observer.
  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { self.0.ptr_eq(&other.0) }
}

impl<Item, Err> Clone for DynamicObserver<Item, Err> {
  #[inline]
  fn clone(&self) -> Self { DynamicObserver(self.0.clone()) }
}

impl<Item, Err> Observer<Item, Err> for DynamicObserver<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { self.0.rc_deref_mut().next(value) }

  #[inline]
  fn next_ref(&mut self, value: &Item)
  where
    Item: Clone,
  {
    self.0.rc_deref_mut().next_ref(value)
  }

  #[inline]
  fn error(&mut self, err: Err) { self.0.rc_deref_mut().error(err) }

  #[inline]
  fn complete(&mut self) { self.0.rc_deref_mut().complete() }

  #[inline]
  fn set_upstream(&mut self, upstream: Subscription) { self.0.rc_deref_mut().set_upstream(upstream) }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.rc_deref_mut().is_disposed() }

  /// Already erased; no second layer of indirection.
  #[inline]
  fn into_dynamic(self) -> DynamicObserver<Item, Err>
  where
    Self: Sized + Send + 'static,
  {
    self
  }
}

impl<Item, Err> Debug for DynamicObserver<Item, Err> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DynamicObserver")
      .field("is_disposed", &self.is_disposed())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;
  use crate::subscription::Disposable;

  #[derive(Default)]
  struct Recorder {
    log: Arc<Mutex<Vec<String>>>,
    upstream: Option<Subscription>,
  }

  impl Observer<String, String> for Recorder {
    fn next(&mut self, value: String) { self.log.lock().unwrap().push(format!("next {value}")); }

    fn next_ref(&mut self, value: &String) {
      self.log.lock().unwrap().push(format!("next_ref {value}"));
    }

    fn error(&mut self, err: String) { self.log.lock().unwrap().push(format!("error {err}")); }

    fn complete(&mut self) { self.log.lock().unwrap().push("complete".into()); }

    fn set_upstream(&mut self, upstream: Subscription) { self.upstream = Some(upstream); }

    fn is_disposed(&self) -> bool { self.upstream.as_ref().is_some_and(|u| u.is_disposed()) }
  }

  #[rxcore_macro::test]
  fn forwards_every_capability() {
    let log = Arc::new(Mutex::new(vec![]));
    let mut dynamic = Recorder { log: log.clone(), upstream: None }.into_dynamic();

    dynamic.next("owned".to_string());
    dynamic.next_ref(&"borrowed".to_string());
    dynamic.complete();
    dynamic.error("late".to_string());

    assert_eq!(
      *log.lock().unwrap(),
      vec!["next owned", "next_ref borrowed", "complete", "error late"]
    );
  }

  #[rxcore_macro::test]
  fn disposal_is_forwarded() {
    let mut dynamic = Recorder::default().into_dynamic();
    let upstream = Subscription::new();
    dynamic.set_upstream(upstream.clone());
    assert!(!dynamic.is_disposed());
    upstream.dispose();
    assert!(dynamic.is_disposed());
  }

  #[rxcore_macro::test]
  fn clones_share_one_observer() {
    let log = Arc::new(Mutex::new(vec![]));
    let a = DynamicObserver::new(Recorder { log: log.clone(), upstream: None });
    let mut b = a.clone();
    b.next("x".to_string());
    assert!(a.ptr_eq(&b));

    let again = b.clone().into_dynamic();
    assert!(again.ptr_eq(&a), "erasing an erased observer must not wrap it twice");
    assert_eq!(log.lock().unwrap().len(), 1);
  }
}
