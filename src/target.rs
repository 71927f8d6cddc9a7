//! The target stack: which subscriber is currently evaluating.
//!
//! Deps discover their reader through [`current`] instead of taking it as a
//! parameter. Entries are pushed through [`TargetGuard`]s only, so the stack
//! always returns to its previous depth when an evaluation ends, including by
//! unwinding. An empty entry (`None`) suspends tracking for nested code, see
//! [`untracked`].

use std::{cell::RefCell, marker::PhantomData, rc::Rc};

use crate::subscriber::Subscriber;

type Entry = Option<Rc<dyn Subscriber>>;

thread_local! {
  static TARGET_STACK: RefCell<Vec<Entry>> = const { RefCell::new(Vec::new()) };
}

/// Scope of one pushed target. Dropping the guard pops it.
#[must_use = "the target is popped as soon as the guard is dropped"]
pub struct TargetGuard {
  depth: usize,
  _not_send: PhantomData<*const ()>,
}

impl Drop for TargetGuard {
  fn drop(&mut self) {
    let _ = TARGET_STACK.try_with(|stack| {
      let mut stack = stack.borrow_mut();
      if stack.len() != self.depth {
        tracing::warn!(
          target: "rxtrack",
          expected = self.depth,
          actual = stack.len(),
          "target guards released out of order"
        );
      }
      stack.truncate(self.depth - 1);
    });
  }
}

fn push(entry: Entry) -> TargetGuard {
  TARGET_STACK.with(|stack| {
    let mut stack = stack.borrow_mut();
    stack.push(entry);
    TargetGuard { depth: stack.len(), _not_send: PhantomData }
  })
}

/// Make `subscriber` the active target until the guard is dropped.
pub fn push_target(subscriber: Rc<dyn Subscriber>) -> TargetGuard { push(Some(subscriber)) }

/// Run `f` with `subscriber` as the active target.
pub fn track<R>(subscriber: Rc<dyn Subscriber>, f: impl FnOnce() -> R) -> R {
  let _guard = push_target(subscriber);
  f()
}

/// Run `f` with tracking suspended: reads inside register nothing.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
  let _guard = push(None);
  f()
}

/// The active subscriber, if any.
pub fn current() -> Option<Rc<dyn Subscriber>> {
  TARGET_STACK.with(|stack| stack.borrow().last().cloned().flatten())
}

/// Whether a read right now would register a dependency.
pub fn is_tracking() -> bool {
  TARGET_STACK.with(|stack| stack.borrow().last().is_some_and(Option::is_some))
}

/// Number of nested evaluations in progress.
pub fn depth() -> usize { TARGET_STACK.with(|stack| stack.borrow().len()) }
