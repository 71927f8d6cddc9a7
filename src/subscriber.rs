//! The subscriber contract consumed from the outside.
//!
//! A subscriber is any computation that wants to be re-run when the data it
//! read changes. It registers itself as the current target while it reads
//! (see [`target`](crate::target)), and deps call [`Subscriber::update`] when
//! something it read is written.

use std::{
  cell::{Cell, RefCell},
  fmt,
  rc::Rc,
};

use crate::{dep::Dep, error::SubscriberError};

pub trait Subscriber {
  /// Invalidation callback, invoked synchronously by [`Dep::notify`].
  ///
  /// An `Err` is reported and does not stop delivery to the other
  /// subscribers of the same dep.
  fn update(&self) -> Result<(), SubscriberError>;

  /// Called once each time `dep` newly registers this subscriber.
  ///
  /// Watchers that need to unregister on teardown record the dep here and
  /// later call [`Dep::remove_subscriber`].
  fn on_depend(&self, _dep: &Dep) {}
}

/// Identity of a subscriber: the address of its `Rc` allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

impl SubscriberId {
  pub fn of(subscriber: &dyn Subscriber) -> Self {
    Self(subscriber as *const dyn Subscriber as *const () as usize)
  }
}

type UpdateFn = dyn FnMut() -> Result<(), SubscriberError>;

/// Re-runs one update may chain before it is reported as runaway.
const MAX_RERUNS: usize = 100;

/// A subscriber backed by a closure.
///
/// An update requested while the closure is running (it wrote something it
/// depends on) is not lost: the closure runs again as soon as the current run
/// returns. Equal writes do not notify, so the chain settles once the written
/// values stop changing; a chain longer than a hundred runs fails with
/// [`SubscriberError::Runaway`].
///
/// ```rust
/// use std::{cell::Cell, rc::Rc};
///
/// use rxtrack::prelude::*;
///
/// let runs = Rc::new(Cell::new(0));
/// let c_runs = runs.clone();
/// let sub = FnSubscriber::new(move || c_runs.set(c_runs.get() + 1));
///
/// let dep = Dep::new();
/// track(sub.clone(), || dep.depend());
/// dep.notify();
/// assert_eq!(runs.get(), 1);
/// ```
pub struct FnSubscriber {
  update: RefCell<Box<UpdateFn>>,
  rerun: Cell<bool>,
}

impl FnSubscriber {
  pub fn new(mut f: impl FnMut() + 'static) -> Rc<Self> {
    Self::fallible(move || {
      f();
      Ok(())
    })
  }

  pub fn fallible(f: impl FnMut() -> Result<(), SubscriberError> + 'static) -> Rc<Self> {
    Rc::new(Self { update: RefCell::new(Box::new(f)), rerun: Cell::new(false) })
  }
}

impl Subscriber for FnSubscriber {
  fn update(&self) -> Result<(), SubscriberError> {
    let Ok(mut update) = self.update.try_borrow_mut() else {
      self.rerun.set(true);
      return Ok(());
    };
    let mut reruns = 0;
    loop {
      self.rerun.set(false);
      (&mut **update)()?;
      if !self.rerun.get() {
        return Ok(());
      }
      reruns += 1;
      if reruns >= MAX_RERUNS {
        self.rerun.set(false);
        return Err(SubscriberError::Runaway(reruns));
      }
    }
  }
}

impl fmt::Debug for FnSubscriber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FnSubscriber").field("id", &SubscriberId::of(self)).finish()
  }
}
