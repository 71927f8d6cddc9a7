//! Errors and the diagnostic channel.
//!
//! Nothing reported here is fatal: data stays usable (possibly non-reactive)
//! after every condition. Diagnostics go to `tracing` and to the warn handler
//! installed in [`config`](crate::config); subscriber failures go to the error
//! handler.

use std::fmt;

use thiserror::Error;

use crate::config;

/// Which mutation helper raised a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationKind {
  Set,
  Delete,
}

impl fmt::Display for MutationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      MutationKind::Set => "set",
      MutationKind::Delete => "delete",
    })
  }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReactiveError {
  #[error("cannot {op} reactive property on {found} value")]
  InvalidTarget { op: MutationKind, found: &'static str },
  #[error("`{0}` is not a valid array index")]
  InvalidArrayKey(String),
  #[error("property `{0}` is not configurable")]
  NonConfigurable(String),
  #[error("cannot add property `{0}`, object is not extensible")]
  NotExtensible(String),
}

/// Advisory conditions reported through the warn channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Diagnostic {
  #[error("cannot {op} reactive property on {found} value")]
  InvalidTarget { op: MutationKind, found: &'static str },
  #[error(
    "avoid adding reactive properties to a framework instance or its root data at runtime, \
     declare `{key}` upfront instead"
  )]
  RootAddition { key: String },
  #[error(
    "avoid deleting properties on a framework instance or its root data, set `{key}` to null \
     instead"
  )]
  RootDeletion { key: String },
  #[error("`{key}` cannot be made reactive: {reason}")]
  Uninstrumentable { key: String, reason: ReactiveError },
}

/// Failure raised by a subscriber's update callback.
#[derive(Debug, Error)]
pub enum SubscriberError {
  #[error("subscriber kept re-triggering itself, gave up after {0} re-runs")]
  Runaway(usize),
  #[error("{0}")]
  Message(String),
  #[error("{0}")]
  Other(Box<dyn std::error::Error>),
}

impl SubscriberError {
  pub fn msg(message: impl Into<String>) -> Self { SubscriberError::Message(message.into()) }
}

impl From<Box<dyn std::error::Error>> for SubscriberError {
  fn from(err: Box<dyn std::error::Error>) -> Self { SubscriberError::Other(err) }
}

/// Report an advisory condition.
pub fn warn(diagnostic: Diagnostic) {
  let (silent, handler) = config::with(|c| (c.silent, c.warn_handler.clone()));
  if !silent {
    tracing::warn!(target: "rxtrack", "{diagnostic}");
  }
  if let Some(handler) = handler {
    handler(&diagnostic);
  }
}

/// Report a failed subscriber update. Delivery to the remaining subscribers of
/// `dep_id` continues regardless.
pub(crate) fn report_subscriber_error(dep_id: usize, err: SubscriberError) {
  match config::with(|c| c.error_handler.clone()) {
    Some(handler) => handler(&err, dep_id),
    None => tracing::error!(target: "rxtrack", dep = dep_id, "subscriber update failed: {err}"),
  }
}

impl From<ReactiveError> for Diagnostic {
  fn from(err: ReactiveError) -> Self {
    match &err {
      ReactiveError::InvalidTarget { op, found } => {
        Diagnostic::InvalidTarget { op: *op, found: *found }
      }
      ReactiveError::InvalidArrayKey(key)
      | ReactiveError::NonConfigurable(key)
      | ReactiveError::NotExtensible(key) => {
        Diagnostic::Uninstrumentable { key: key.clone(), reason: err.clone() }
      }
    }
  }
}
