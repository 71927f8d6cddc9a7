use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::subscriber::{Subscriber, SubscriberId};

/// Subscriber set of one dep.
///
/// Entries are kept in registration order and are unique by
/// [`SubscriberId`]. Subscribers are held weakly: a dep never keeps a
/// subscriber alive, dead entries are pruned when the set is next snapshotted.
///
/// A weak entry keeps the subscriber's allocation reserved, so an id can not be
/// reused by a new subscriber while a stale entry still carries it.
pub struct Subscribers {
  items: SmallVec<[(SubscriberId, Weak<dyn Subscriber>); 2]>,
}

impl Default for Subscribers {
  fn default() -> Self { Self { items: SmallVec::new() } }
}

impl Subscribers {
  /// Append `subscriber` unless it is already registered. Returns `true` if it
  /// was added.
  pub fn add(&mut self, subscriber: &Rc<dyn Subscriber>) -> bool {
    let id = SubscriberId::of(&**subscriber);
    if self.contains(id) {
      return false;
    }
    self.items.push((id, Rc::downgrade(subscriber)));
    true
  }

  /// Remove a subscriber by identity.
  pub fn remove(&mut self, id: SubscriberId) -> bool {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos))
      .is_some()
  }

  #[inline]
  pub fn contains(&self, id: SubscriberId) -> bool { self.items.iter().any(|(i, _)| *i == id) }

  /// Number of registered subscribers that are still alive.
  pub fn len(&self) -> usize { self.items.iter().filter(|(_, w)| w.strong_count() > 0).count() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// Upgrade every live subscriber, in registration order, dropping the dead
  /// ones from the set.
  pub fn snapshot(&mut self) -> SmallVec<[Rc<dyn Subscriber>; 4]> {
    let mut live = SmallVec::new();
    self.items.retain(|(_, weak)| match weak.upgrade() {
      Some(subscriber) => {
        live.push(subscriber);
        true
      }
      None => false,
    });
    live
  }
}
