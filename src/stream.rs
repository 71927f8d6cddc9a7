//! Change streams.
//!
//! [`ChangeStream`] turns invalidations into a [`futures::Stream`]: it runs a
//! read closure under tracking and yields the closure's result again each time
//! something it read changes.
//!
//! ```rust
//! use futures::{executor::block_on, StreamExt};
//! use rxtrack::prelude::*;
//!
//! let state = object! { "count" => 1 };
//! observe(&state.clone().into(), false);
//!
//! let c_state = state.clone();
//! let mut counts = ChangeStream::new(move || c_state.get("count").as_number());
//!
//! block_on(async {
//!   assert_eq!(counts.next().await, Some(Some(1.)));
//!   state.put("count", 2);
//!   assert_eq!(counts.next().await, Some(Some(2.)));
//! });
//! ```

use std::{
  pin::Pin,
  rc::Rc,
  task::{Context, Poll, Waker},
};

use futures::Stream;

use crate::{
  error::SubscriberError,
  rc::{MutRc, RcDeref, RcDerefMut},
  subscriber::Subscriber,
  target::track,
};

/// State shared between the stream and the subscriber that deps hold.
struct ChangeState {
  /// Something read by the last evaluation changed since.
  dirty: bool,
  /// Invalidations received so far.
  changes: u64,
  waker: Option<Waker>,
}

struct ChangeSubscriber {
  state: MutRc<ChangeState>,
}

impl Subscriber for ChangeSubscriber {
  fn update(&self) -> Result<(), SubscriberError> {
    let waker = {
      let mut state = self.state.rc_deref_mut();
      state.dirty = true;
      state.changes += 1;
      state.waker.take()
    };
    if let Some(waker) = waker {
      waker.wake();
    }
    Ok(())
  }
}

/// A stream of re-evaluations of a tracked read.
///
/// - The first poll evaluates immediately.
/// - Later polls stay pending until a dependency of the previous evaluation
///   is invalidated, then evaluate again. Invalidations between two polls are
///   coalesced into one item.
/// - The stream never ends on its own. Dropping it releases its subscriber,
///   and deps forget it on their next notify.
///
/// Dependencies accumulate over evaluations: a key read once keeps waking
/// the stream even if later evaluations no longer read it.
pub struct ChangeStream<T> {
  state: MutRc<ChangeState>,
  subscriber: Rc<ChangeSubscriber>,
  read: Box<dyn FnMut() -> T>,
}

impl<T> ChangeStream<T> {
  pub fn new(read: impl FnMut() -> T + 'static) -> Self {
    let state = MutRc::own(ChangeState { dirty: true, changes: 0, waker: None });
    let subscriber = Rc::new(ChangeSubscriber { state: state.clone() });
    Self { state, subscriber, read: Box::new(read) }
  }

  /// The subscriber the stream evaluates as, for registering on a dep
  /// directly. Holding a clone keeps the registration alive past the stream.
  pub fn subscriber(&self) -> Rc<dyn Subscriber> { self.subscriber.clone() }

  /// Total invalidations received, including coalesced ones.
  pub fn changes(&self) -> u64 { self.state.rc_deref().changes }

  /// Whether the next poll will evaluate.
  pub fn is_dirty(&self) -> bool { self.state.rc_deref().dirty }
}

impl<T> Stream for ChangeStream<T> {
  type Item = T;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
    let this = self.get_mut();
    {
      let mut state = this.state.rc_deref_mut();
      if !state.dirty {
        state.waker = Some(cx.waker().clone());
        return Poll::Pending;
      }
      state.dirty = false;
    }
    let value = track(this.subscriber.clone(), &mut this.read);
    Poll::Ready(Some(value))
  }
}
