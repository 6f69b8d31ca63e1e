use smallvec::SmallVec;

use crate::observer::Observer;

/// Observers currently attached to a subject, keyed by a per-subject id.
///
/// - **SmallVec Optimization**: the common case of 0-2 observers needs no
///   heap allocation.
/// - **Pre-allocation Pattern**: `reserve_id()` + `insert()` hands out the id
///   before the observer is stored, so the observer's own subscription can
///   refer to it.
pub(crate) struct Subscribers<Ob> {
  next_id: usize,
  items: SmallVec<[(usize, Ob); 2]>,
}

impl<Ob> Default for Subscribers<Ob> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<Ob> Subscribers<Ob> {
  #[inline]
  pub(crate) fn reserve_id(&mut self) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    id
  }

  /// Insert an observer with a pre-reserved id.
  #[inline]
  pub(crate) fn insert(&mut self, id: usize, observer: Ob) { self.items.push((id, observer)); }

  pub(crate) fn remove(&mut self, id: usize) -> Option<Ob> {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.items.len() }

  /// Takes every observer out, leaving the container empty.
  pub(crate) fn take_all(&mut self) -> SmallVec<[Ob; 2]> {
    self.items.drain(..).map(|(_, ob)| ob).collect()
  }
}

impl<Ob: Clone> Subscribers<Ob> {
  /// Copies the current observer list so it can be signalled without holding
  /// the subject's lock.
  pub(crate) fn snapshot(&self) -> SmallVec<[Ob; 2]> {
    self.items.iter().map(|(_, ob)| ob.clone()).collect()
  }
}

/// Sends `value` to every observer: clones for all but the last, which
/// receives the moved value.
pub(crate) fn broadcast_value<Ob, Item, Err>(observers: impl IntoIterator<Item = Ob>, value: Item)
where
  Ob: Observer<Item, Err>,
  Item: Clone,
{
  let mut iter = observers.into_iter().peekable();
  while let Some(mut observer) = iter.next() {
    if iter.peek().is_some() {
      observer.next(value.clone());
    } else {
      observer.next(value);
      break;
    }
  }
}

pub(crate) fn broadcast_error<Ob, Item, Err>(observers: impl IntoIterator<Item = Ob>, err: Err)
where
  Ob: Observer<Item, Err>,
  Err: Clone,
{
  let mut iter = observers.into_iter().peekable();
  while let Some(mut observer) = iter.next() {
    if iter.peek().is_some() {
      observer.error(err.clone());
    } else {
      observer.error(err);
      break;
    }
  }
}

pub(crate) fn broadcast_complete<Ob, Item, Err>(observers: impl IntoIterator<Item = Ob>)
where
  Ob: Observer<Item, Err>,
{
  for mut observer in observers {
    observer.complete();
  }
}
