//! Subject: an observer and an observable at once.
//!
//! Everything a subject receives is multicast to the observers subscribed at
//! that moment. Once it has terminated, late subscribers receive the same
//! terminal signal right away.

use std::{
  fmt::{Debug, Formatter},
  thread::{self, ThreadId},
};

use smallvec::SmallVec;
use tracing::debug;

use crate::{
  observable::Observable,
  observer::{DynamicObserver, Observer},
  rc::{MutArc, RcDerefMut},
  subscription::{Disposable, Subscription},
};

mod subscribers;
use subscribers::{broadcast_complete, broadcast_error, broadcast_value, Subscribers};

struct Entry<Item, Err> {
  observer: DynamicObserver<Item, Err>,
  subscription: Subscription,
}

impl<Item, Err> Clone for Entry<Item, Err> {
  fn clone(&self) -> Self {
    Entry { observer: self.observer.clone(), subscription: self.subscription.clone() }
  }
}

#[derive(Clone)]
enum Terminal<Err> {
  Completed,
  Errored(Err),
}

impl<Err> Terminal<Err> {
  fn deliver<Item>(self, mut observer: impl Observer<Item, Err>) {
    match self {
      Terminal::Completed => observer.complete(),
      Terminal::Errored(err) => observer.error(err),
    }
  }
}

struct SubjectState<Item, Err> {
  observers: Subscribers<Entry<Item, Err>>,
  terminal: Option<Terminal<Err>>,
  /// Threads currently inside a `next`/`error`/`complete` of this subject.
  emitting: SmallVec<[ThreadId; 1]>,
}

const REENTRANT_EMISSION: &str = "re-entrant Subject emissions are not supported \
                                  (next/error/complete). Use an explicit async boundary \
                                  (e.g. subscribe_on) if you need feedback loops.";

/// Marks the current thread as emitting into a subject until dropped.
struct Emission<'a, Item, Err> {
  state: &'a MutArc<SubjectState<Item, Err>>,
  thread: ThreadId,
}

impl<Item, Err> Drop for Emission<'_, Item, Err> {
  fn drop(&mut self) {
    let mut state = self.state.rc_deref_mut();
    if let Some(pos) = state.emitting.iter().position(|t| *t == self.thread) {
      state.emitting.swap_remove(pos);
    }
  }
}

/// Hot multicast source.
///
/// # Re-entrancy
///
/// Emissions are not re-entrant: calling `next`, `error` or `complete` on a
/// subject from inside one of that subject's own callbacks, on the same
/// thread, panics. Subscribing and unsubscribing from inside a callback is
/// allowed. Different threads may emit concurrently.
///
/// Clones share the same observer list. Signals are broadcast to a snapshot
/// of the list taken under the lock, and the lock is released before any
/// observer runs, so observers may subscribe or unsubscribe from inside their
/// callbacks. An observer added during a broadcast starts with the next
/// value.
///
/// The subject owns an extent subscription ([`Subject::subscription`]).
/// Upstreams feeding the subject are attached to it, and disposing it ends
/// every current observer session.
pub struct Subject<Item, Err> {
  state: MutArc<SubjectState<Item, Err>>,
  subscription: Subscription,
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self {
    Subject { state: self.state.clone(), subscription: self.subscription.clone() }
  }
}

impl<Item, Err> Default for Subject<Item, Err>
where
  Item: 'static,
  Err: Send + 'static,
{
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Subject<Item, Err>
where
  Item: 'static,
  Err: Send + 'static,
{
  pub fn new() -> Self {
    let state = MutArc::own(SubjectState {
      observers: Subscribers::default(),
      terminal: None,
      emitting: SmallVec::new(),
    });
    let weak = state.downgrade();
    let subscription = Subscription::from_fn(move || {
      let Some(state) = weak.upgrade() else { return };
      let entries = state.rc_deref_mut().observers.take_all();
      for entry in entries {
        entry.subscription.dispose();
      }
    });
    Subject { state, subscription }
  }
}

impl<Item, Err> Subject<Item, Err> {
  /// The subject's own extent.
  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.subscription }

  pub fn observer_count(&self) -> usize { self.state.rc_deref_mut().observers.len() }

  /// Whether `error` or `complete` has been received.
  pub fn is_terminated(&self) -> bool { self.state.rc_deref_mut().terminal.is_some() }

  /// Registers the current thread as emitting.
  ///
  /// # Panics
  ///
  /// If the current thread is already emitting into this subject.
  fn enter(&self) -> Emission<'_, Item, Err> {
    let thread = thread::current().id();
    let reentrant = {
      let mut state = self.state.rc_deref_mut();
      let reentrant = state.emitting.contains(&thread);
      if !reentrant {
        state.emitting.push(thread);
      }
      reentrant
    };
    if reentrant {
      panic!("{}", REENTRANT_EMISSION);
    }
    Emission { state: &self.state, thread }
  }

  /// Stores `terminal` and hands back everything that must be notified, or
  /// `None` if another terminal got there first.
  fn terminate(&self, terminal: Terminal<Err>) -> Option<Vec<Entry<Item, Err>>> {
    let mut state = self.state.rc_deref_mut();
    if state.terminal.is_some() {
      return None;
    }
    state.terminal = Some(terminal);
    Some(state.observers.take_all().into_vec())
  }

  fn release(&self, entries: Vec<Entry<Item, Err>>) {
    for entry in entries {
      entry.subscription.dispose();
    }
    self.subscription.dispose();
  }
}

impl<Item, Err> Observer<Item, Err> for Subject<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) {
    let _emission = self.enter();
    let entries = {
      let state = self.state.rc_deref_mut();
      if state.terminal.is_some() || self.subscription.is_disposed() {
        return;
      }
      state.observers.snapshot()
    };
    broadcast_value(
      entries
        .into_iter()
        .filter(|e| !e.subscription.is_disposed())
        .map(|e| e.observer),
      value,
    );
  }

  fn error(&mut self, err: Err) {
    let _emission = self.enter();
    let Some(entries) = self.terminate(Terminal::Errored(err.clone())) else { return };
    debug!(observers = entries.len(), "subject errored");
    broadcast_error(entries.iter().map(|e| e.observer.clone()), err);
    self.release(entries);
  }

  fn complete(&mut self) {
    let _emission = self.enter();
    let Some(entries) = self.terminate(Terminal::Completed) else { return };
    debug!(observers = entries.len(), "subject completed");
    broadcast_complete(entries.iter().map(|e| e.observer.clone()));
    self.release(entries);
  }

  #[inline]
  fn set_upstream(&mut self, upstream: Subscription) { self.subscription.add(upstream) }

  fn is_disposed(&self) -> bool { self.subscription.is_disposed() || self.is_terminated() }
}

impl<Item, Err> Observable<Item, Err> for Subject<Item, Err>
where
  Item: 'static,
  Err: Clone + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let mut observer = observer.into_dynamic();
    let (id, terminal) = {
      let mut state = self.state.rc_deref_mut();
      (state.observers.reserve_id(), state.terminal.clone())
    };

    let weak = self.state.downgrade();
    let subscription = Subscription::from_fn(move || {
      if let Some(state) = weak.upgrade() {
        state.rc_deref_mut().observers.remove(id);
      }
    });
    observer.set_upstream(subscription.clone());

    if let Some(terminal) = terminal {
      terminal.deliver(observer);
      subscription.dispose();
      return subscription;
    }

    let late_terminal = {
      let mut state = self.state.rc_deref_mut();
      match &state.terminal {
        Some(terminal) => Some(terminal.clone()),
        None => {
          if !self.subscription.is_disposed() && !subscription.is_disposed() {
            let entry = Entry { observer: observer.clone(), subscription: subscription.clone() };
            state.observers.insert(id, entry);
          }
          None
        }
      }
    };
    if let Some(terminal) = late_terminal {
      terminal.deliver(observer);
      subscription.dispose();
    } else if self.subscription.is_disposed() {
      subscription.dispose();
    }
    subscription
  }
}

impl<Item, Err> Debug for Subject<Item, Err> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subject")
      .field("observer_count", &self.observer_count())
      .field("is_terminated", &self.is_terminated())
      .finish()
  }
}
