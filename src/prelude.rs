//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and functions for easy access.

// Array instrumentation
pub use crate::array_methods::ArrayMethod;
// Dependency subjects
pub use crate::dep::{Dep, NotifyReport};
// Errors and diagnostics
pub use crate::error::{Diagnostic, MutationKind, ReactiveError, SubscriberError};
// Dynamic key addition and removal
pub use crate::mutation::{delete, set};
// Observation
pub use crate::observer::{
  is_observation_enabled, observe, set_observation_enabled, without_observation, Observer,
};
// Property interception
pub use crate::reactive::{define_reactive, CustomSetter};
// Async interop
pub use crate::stream::ChangeStream;
// Subscribers and the target stack
pub use crate::subscriber::{FnSubscriber, Subscriber, SubscriberId};
pub use crate::target::{push_target, track, untracked, TargetGuard};
// Values
pub use crate::value::{
  ArrayRef, Getter, Key, ObjectKind, ObjectRef, Opaque, PropertyDescriptor, Setter, Value,
};
pub use crate::{array, object};
