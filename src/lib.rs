//! # rxtrack: fine-grained dependency tracking
//!
//! Observe a mutable object graph, run computations against it, and get told
//! which computations to re-run when the data they read changes.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//!
//! use rxtrack::prelude::*;
//!
//! let state = object! { "user" => object! { "name" => "ada" } };
//! observe(&state.clone().into(), true);
//!
//! let renders = Rc::new(Cell::new(0));
//! let c_renders = renders.clone();
//! let view = FnSubscriber::new(move || c_renders.set(c_renders.get() + 1));
//!
//! // Reads made while `view` is the target register it.
//! let user = track(view.clone(), || state.get("user"));
//! let user = user.as_object().unwrap();
//! track(view.clone(), || user.get("name"));
//!
//! user.put("name", "grace");
//! assert_eq!(renders.get(), 1);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Value`] | Tagged values; objects and arrays are shared by reference |
//! | [`Dep`] | Subscriber list of one property or one container |
//! | [`Subscriber`] | A computation to invalidate, registered while it reads |
//! | [`Observer`] | Marker attached to a tracked object or array |
//! | [`ChangeStream`] | Async adapter yielding a read again after each change |
//!
//! Everything is single threaded: tracked values are `Rc`-based and the target
//! stack, configuration and observation toggle are thread local.
//!
//! [`Value`]: value::Value
//! [`Dep`]: dep::Dep
//! [`Subscriber`]: subscriber::Subscriber
//! [`Observer`]: observer::Observer
//! [`ChangeStream`]: stream::ChangeStream

pub mod array_methods;
pub mod config;
pub mod dep;
pub mod error;
pub mod mutation;
pub mod observer;
pub mod prelude;
pub mod rc;
pub mod reactive;
pub mod stream;
pub mod subscriber;
pub mod target;
pub mod value;

// Re-export the prelude module
pub use prelude::*;

#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
