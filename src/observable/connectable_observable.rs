use tracing::debug;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  ops::ref_count::RefCount,
  rc::{MutArc, RcDerefMut},
  subject::Subject,
  subscription::{Disposable, Subscription},
};

/// A cold source shared through a subject once connected.
///
/// Subscribing to a `ConnectableObservable` only attaches to its subject.
/// The source itself is subscribed by [`connect`](Self::connect), and all
/// subject observers then share that single upstream subscription. Clones
/// share the subject and the connection state.
///
/// At most one connection is live at a time. Disposing it disconnects, and a
/// later `connect` subscribes the source again.
pub struct ConnectableObservable<S, Item, Err> {
  source: S,
  subject: Subject<Item, Err>,
  connection: MutArc<Subscription>,
}

impl<S: Clone, Item, Err> Clone for ConnectableObservable<S, Item, Err> {
  fn clone(&self) -> Self {
    ConnectableObservable {
      source: self.source.clone(),
      subject: self.subject.clone(),
      connection: self.connection.clone(),
    }
  }
}

impl<S, Item, Err> ConnectableObservable<S, Item, Err> {
  pub fn new(source: S, subject: Subject<Item, Err>) -> Self {
    ConnectableObservable { source, subject, connection: MutArc::own(Subscription::empty()) }
  }

  /// The subject downstream observers attach to.
  #[inline]
  pub fn fork(&self) -> Subject<Item, Err> { self.subject.clone() }

  /// Whether a connection is currently held.
  ///
  /// Takes the connection lock, so calling it from code that runs while the
  /// source is being connected synchronously deadlocks (see
  /// [`connect`](Self::connect)).
  pub fn is_connected(&self) -> bool { !self.connection.rc_deref_mut().is_empty() }

  /// Connects on the first subscriber and disconnects when the last one
  /// leaves.
  #[inline]
  pub fn ref_count(self) -> RefCount<S, Item, Err> { RefCount::new(self) }
}

impl<S, Item, Err> ConnectableObservable<S, Item, Err>
where
  S: Observable<Item, Err> + Clone,
  Item: Clone + 'static,
  Err: Clone + Send + 'static,
{
  /// Subscribes the source into the subject, unless already connected.
  ///
  /// Returns the subscription that represents the connection; disposing it
  /// disconnects. While connected, further calls return the live connection
  /// instead of subscribing again.
  ///
  /// # Deadlocks
  ///
  /// The connection lock is held while the source is subscribed. A source or
  /// subject observer that synchronously calls `connect`, `connect_with` or
  /// `is_connected` on the same connectable during that subscribe deadlocks.
  pub fn connect(&self) -> Subscription {
    match self.try_connect(Subscription::new()) {
      Ok(connection) | Err(connection) => connection,
    }
  }

  /// Connects using `subscription` as the connection handle.
  ///
  /// If already connected, `subscription` is returned untouched and the
  /// source is not subscribed again. Otherwise `subscription` is attached to
  /// the subject's extent, becomes the held connection, and carries the
  /// source's upstream. Disposing it releases the held connection so a later
  /// call can reconnect.
  ///
  /// # Deadlocks
  ///
  /// The connection lock is held while the source is subscribed. A source or
  /// subject observer that synchronously calls `connect`, `connect_with` or
  /// `is_connected` on the same connectable during that subscribe deadlocks.
  pub fn connect_with(&self, subscription: Subscription) -> Subscription {
    let _ = self.try_connect(subscription.clone());
    subscription
  }

  /// `Ok` with `subscription` if it became the connection, `Err` with the
  /// live connection otherwise.
  fn try_connect(&self, subscription: Subscription) -> Result<Subscription, Subscription> {
    {
      let mut held = self.connection.rc_deref_mut();
      if !held.is_empty() {
        return Err(held.clone());
      }
      *held = subscription.clone();
      debug!("connectable connecting");
      let upstream = self
        .source
        .clone()
        .subscribe_with(subscription.clone(), self.subject.clone());
      subscription.add(upstream);
    }

    let connection = self.connection.clone();
    let extent = self.subject.subscription().clone();
    subscription.add_teardown(move || {
      let released = std::mem::replace(&mut *connection.rc_deref_mut(), Subscription::empty());
      released.dispose();
      extent.remove(&released);
      debug!("connectable disconnected");
    });
    Ok(subscription)
  }
}

impl<S, Item, Err> Observable<Item, Err> for ConnectableObservable<S, Item, Err>
where
  Item: 'static,
  Err: Clone + Send + 'static,
{
  #[inline]
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    self.subject.actual_subscribe(observer)
  }
}
