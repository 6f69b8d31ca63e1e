//! Make a ConnectableObservable behave like an ordinary observable and
//! automate the way you connect to it.
//!
//! Internally it counts the subscriptions to the observable and connects
//! (only once) when the count goes from zero to one. When the count drops
//! back to zero it disposes the connection. This way everything before the
//! ref-count has only a single subscription independently of the number of
//! subscribers to the target observable.

use tracing::debug;

use crate::{
  observable::{ConnectableObservable, Observable},
  observer::Observer,
  rc::{MutArc, RcDerefMut},
  subscription::{Disposable, Subscription},
};

struct RefCountState {
  subscribers: usize,
  connection: Subscription,
}

pub struct RefCount<S, Item, Err> {
  connectable: ConnectableObservable<S, Item, Err>,
  state: MutArc<RefCountState>,
}

impl<S: Clone, Item, Err> Clone for RefCount<S, Item, Err> {
  fn clone(&self) -> Self {
    RefCount { connectable: self.connectable.clone(), state: self.state.clone() }
  }
}

impl<S, Item, Err> RefCount<S, Item, Err> {
  pub(crate) fn new(connectable: ConnectableObservable<S, Item, Err>) -> Self {
    RefCount {
      connectable,
      state: MutArc::own(RefCountState { subscribers: 0, connection: Subscription::empty() }),
    }
  }

  pub fn subscriber_count(&self) -> usize { self.state.rc_deref_mut().subscribers }
}

impl<S, Item, Err> Observable<Item, Err> for RefCount<S, Item, Err>
where
  S: Observable<Item, Err> + Clone,
  Item: Clone + 'static,
  Err: Clone + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let subscription = self.connectable.fork().actual_subscribe(observer);
    if subscription.is_disposed() {
      // The subject already terminated and replayed to this observer.
      return subscription;
    }

    let first = {
      let mut state = self.state.rc_deref_mut();
      state.subscribers += 1;
      state.subscribers == 1
    };

    let state = self.state.clone();
    subscription.add_teardown(move || {
      let connection = {
        let mut state = state.rc_deref_mut();
        state.subscribers -= 1;
        if state.subscribers > 0 {
          return;
        }
        std::mem::replace(&mut state.connection, Subscription::empty())
      };
      debug!("ref_count released its last subscriber");
      connection.dispose();
    });

    if first {
      let connection = self.connectable.connect();
      let mut state = self.state.rc_deref_mut();
      if state.subscribers == 0 {
        drop(state);
        connection.dispose();
      } else {
        state.connection = connection;
      }
    }
    subscription
  }
}
