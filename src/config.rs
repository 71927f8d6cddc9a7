//! Thread-local runtime configuration.
//!
//! Tracked values are `Rc`-based and never cross threads, so the configuration
//! lives next to them in thread-local storage rather than behind a lock.

use std::{cell::RefCell, rc::Rc};

use crate::error::{Diagnostic, SubscriberError};

pub type WarnHandler = Rc<dyn Fn(&Diagnostic)>;
/// Receives a failed subscriber update and the id of the notifying dep.
pub type ErrorHandler = Rc<dyn Fn(&SubscriberError, usize)>;

#[derive(Clone, Default)]
pub struct Config {
  /// Suppress `tracing` output for diagnostics. Handlers still run.
  pub silent: bool,
  pub warn_handler: Option<WarnHandler>,
  /// Replaces the default `tracing::error!` report of subscriber failures.
  pub error_handler: Option<ErrorHandler>,
}

thread_local! {
  static CONFIG: RefCell<Config> = RefCell::new(Config::default());
}

/// Read the current configuration.
///
/// The borrow is held for the duration of `f`; clone handlers out before
/// calling them.
pub fn with<R>(f: impl FnOnce(&Config) -> R) -> R { CONFIG.with(|c| f(&c.borrow())) }

pub fn update(f: impl FnOnce(&mut Config)) { CONFIG.with(|c| f(&mut c.borrow_mut())) }

/// Restore the default configuration.
pub fn reset() { update(|c| *c = Config::default()) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn update_and_reset() {
    update(|c| c.silent = true);
    assert!(with(|c| c.silent));
    reset();
    assert!(!with(|c| c.silent));
    assert!(with(|c| c.warn_handler.is_none() && c.error_handler.is_none()));
  }
}
