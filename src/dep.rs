//! Dependency subjects.
//!
//! A [`Dep`] is the publish list of one tracked property or one observed
//! container. Reads call [`Dep::depend`], which registers whatever subscriber
//! is currently on the target stack; writes call [`Dep::notify`].

mod subscribers;

use std::{
  cell::{Cell, RefCell},
  fmt,
  rc::Rc,
};

pub use subscribers::Subscribers;

use crate::{
  error::report_subscriber_error,
  subscriber::{Subscriber, SubscriberId},
  target,
};

thread_local! {
  static NEXT_DEP_ID: Cell<usize> = const { Cell::new(0) };
}

/// Outcome of one [`Dep::notify`] fan-out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NotifyReport {
  pub delivered: usize,
  pub failed: usize,
}

#[derive(Clone)]
pub struct Dep(Rc<DepInner>);

struct DepInner {
  id: usize,
  subscribers: RefCell<Subscribers>,
}

impl Default for Dep {
  fn default() -> Self { Self::new() }
}

impl Dep {
  pub fn new() -> Self {
    let id = NEXT_DEP_ID.with(|next| {
      let id = next.get();
      next.set(id + 1);
      id
    });
    Dep(Rc::new(DepInner { id, subscribers: RefCell::default() }))
  }

  #[inline]
  pub fn id(&self) -> usize { self.0.id }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }

  /// Register the active subscriber, if any.
  ///
  /// Registering the same subscriber twice is a no-op; the `on_depend` hook
  /// only fires for a new registration.
  pub fn depend(&self) {
    if let Some(subscriber) = target::current() {
      if self.add_subscriber(&subscriber) {
        subscriber.on_depend(self);
      }
    }
  }

  /// Register `subscriber` directly. Returns `false` if it already was.
  pub fn add_subscriber(&self, subscriber: &Rc<dyn Subscriber>) -> bool {
    self.0.subscribers.borrow_mut().add(subscriber)
  }

  pub fn remove_subscriber(&self, subscriber: &dyn Subscriber) -> bool {
    self
      .0
      .subscribers
      .borrow_mut()
      .remove(SubscriberId::of(subscriber))
  }

  pub fn has_subscriber(&self, subscriber: &dyn Subscriber) -> bool {
    self
      .0
      .subscribers
      .borrow()
      .contains(SubscriberId::of(subscriber))
  }

  pub fn subscriber_count(&self) -> usize { self.0.subscribers.borrow().len() }

  /// Invoke every registered subscriber, in registration order.
  ///
  /// Iterates a snapshot taken on entry: subscribers added during the
  /// fan-out are not called this round, and no borrow is held while callbacks
  /// run, so they may read, write and notify freely. A failing subscriber is
  /// reported and the fan-out continues.
  pub fn notify(&self) -> NotifyReport {
    let subscribers = self.0.subscribers.borrow_mut().snapshot();
    tracing::trace!(target: "rxtrack", dep = self.id(), count = subscribers.len(), "notify");

    let mut report = NotifyReport::default();
    for subscriber in subscribers {
      match subscriber.update() {
        Ok(()) => report.delivered += 1,
        Err(err) => {
          report.failed += 1;
          report_subscriber_error(self.id(), err);
        }
      }
    }
    report
  }
}

impl fmt::Debug for Dep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Dep")
      .field("id", &self.id())
      .field("subscribers", &self.subscriber_count())
      .finish()
  }
}
