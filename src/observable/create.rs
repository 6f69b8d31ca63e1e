use std::marker::PhantomData;

use crate::{
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
  subscription::Subscription,
};

/// Creates an observable from a subscribe function.
///
/// `subscribe` runs once per subscription and receives a [`Subscriber`] to
/// emit through. Because a source may be subscribed several times (for
/// example by a connectable that reconnects), `create` observables are
/// `Clone` whenever `subscribe` is.
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use rxcore::prelude::*;
///
/// let seen = Arc::new(Mutex::new(vec![]));
/// let c_seen = seen.clone();
/// observable::create(|mut subscriber: Subscriber<i32, String>| {
///   subscriber.next(1);
///   subscriber.next(2);
///   subscriber.complete();
/// })
/// .subscribe(move |v| c_seen.lock().unwrap().push(v));
///
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
/// ```
pub fn create<F, Item, Err>(subscribe: F) -> Create<F, Item, Err>
where
  F: FnOnce(Subscriber<Item, Err>),
{
  Create { subscribe, _marker: PhantomData }
}

pub struct Create<F, Item, Err> {
  subscribe: F,
  _marker: PhantomData<fn() -> (Item, Err)>,
}

impl<F: Clone, Item, Err> Clone for Create<F, Item, Err> {
  fn clone(&self) -> Self { Create { subscribe: self.subscribe.clone(), _marker: PhantomData } }
}

impl<F, Item, Err> Observable<Item, Err> for Create<F, Item, Err>
where
  F: FnOnce(Subscriber<Item, Err>),
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let subscriber = Subscriber::new(observer.into_dynamic());
    let subscription = subscriber.subscription().clone();
    (self.subscribe)(subscriber);
    subscription
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::{
      atomic::{AtomicBool, Ordering},
      Arc, Mutex,
    },
    thread,
  };

  use crate::prelude::*;

  #[rxcore_macro::test]
  fn signals_after_terminal_are_dropped() {
    let log = Arc::new(Mutex::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    observable::create(|mut s: Subscriber<i32, &'static str>| {
      s.next(1);
      s.error("first");
      s.next(2);
      s.complete();
      s.error("second");
    })
    .subscribe_all(
      move |v| l1.lock().unwrap().push(format!("next {v}")),
      move |e| l2.lock().unwrap().push(format!("error {e}")),
      move || l3.lock().unwrap().push("complete".to_string()),
    );

    assert_eq!(*log.lock().unwrap(), vec!["next 1", "error first"]);
  }

  #[rxcore_macro::test]
  fn terminal_releases_resources() {
    let released = Arc::new(AtomicBool::new(false));
    let c_released = released.clone();
    let subscription = observable::create(move |mut s: Subscriber<i32, ()>| {
      s.subscription()
        .add_teardown(move || c_released.store(true, Ordering::SeqCst));
      s.complete();
    })
    .subscribe(|_| {});

    assert!(released.load(Ordering::SeqCst));
    assert!(subscription.is_disposed());
  }

  #[rxcore_macro::test]
  fn dispose_stops_emission_from_another_thread() {
    let (tx, rx) = std::sync::mpsc::channel::<()>();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    let worker = Arc::new(Mutex::new(None));
    let c_worker = worker.clone();

    let subscription = observable::create(move |mut s: Subscriber<i32, ()>| {
      let handle = thread::spawn(move || {
        s.next(1);
        rx.recv().unwrap();
        s.next(2);
        s.complete();
      });
      *c_worker.lock().unwrap() = Some(handle);
    })
    .subscribe(move |v| c_seen.lock().unwrap().push(v));

    let handle = worker.lock().unwrap().take().unwrap();
    while seen.lock().unwrap().is_empty() {
      thread::yield_now();
    }
    subscription.dispose();
    tx.send(()).unwrap();
    handle.join().unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![1]);
  }

  #[rxcore_macro::test]
  fn subscriber_sees_downstream_disposal() {
    let checked = Arc::new(AtomicBool::new(false));
    let c_checked = checked.clone();
    let subscription = Subscription::new();
    let c_subscription = subscription.clone();
    observable::create(move |mut s: Subscriber<i32, ()>| {
      s.next(1);
      c_checked.store(s.is_disposed(), Ordering::SeqCst);
    })
    .subscribe_with(
      subscription.clone(),
      crate::observer::FnObserver::new(
        move |_| c_subscription.dispose(),
        |_: ()| {},
        || {},
      ),
    );

    assert!(subscription.is_disposed());
    assert!(checked.load(Ordering::SeqCst));
  }
}
