use std::rc::Rc;

use indexmap::IndexMap;

use super::Value;
use crate::{
  error::ReactiveError,
  observer::Observer,
  rc::{MutRc, RcDeref, RcDerefMut},
  reactive::ReactiveProperty,
};

/// A pre-existing property getter.
pub type Getter = Rc<dyn Fn() -> Value>;
/// A pre-existing property setter.
pub type Setter = Rc<dyn Fn(Value)>;

/// What kind of record an [`ObjectRef`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ObjectKind {
  /// An ordinary key/value record; may be observed.
  #[default]
  Plain,
  /// A framework-owned instance (e.g. a component). Never observed, and
  /// dynamic property addition/removal on it is refused.
  Instance,
}

#[derive(Clone)]
pub(crate) enum PropertyKind {
  Data(Value),
  Accessor { get: Option<Getter>, set: Option<Setter> },
  Reactive(Rc<ReactiveProperty>),
}

#[derive(Clone)]
pub(crate) struct PropertySlot {
  pub(crate) kind: PropertyKind,
  pub(crate) enumerable: bool,
  pub(crate) configurable: bool,
}

/// Descriptor passed to [`ObjectRef::define_property`].
#[derive(Clone)]
pub struct PropertyDescriptor {
  kind: PropertyKind,
  enumerable: bool,
  configurable: bool,
}

impl PropertyDescriptor {
  /// An enumerable, configurable data property.
  pub fn data(value: impl Into<Value>) -> Self {
    Self { kind: PropertyKind::Data(value.into()), enumerable: true, configurable: true }
  }

  /// An enumerable, configurable accessor property.
  pub fn accessor(get: Option<Getter>, set: Option<Setter>) -> Self {
    Self { kind: PropertyKind::Accessor { get, set }, enumerable: true, configurable: true }
  }

  pub fn enumerable(mut self, enumerable: bool) -> Self {
    self.enumerable = enumerable;
    self
  }

  pub fn configurable(mut self, configurable: bool) -> Self {
    self.configurable = configurable;
    self
  }
}

#[derive(Default)]
pub(crate) struct ObjectData {
  props: IndexMap<String, PropertySlot>,
  observer: Option<Observer>,
  kind: ObjectKind,
  sealed: bool,
}

/// A shared, insertion-ordered record.
///
/// `get` and `put` are the property traps: on an instrumented key they run
/// the reactive getter/setter, on an accessor they run the user accessor, and
/// otherwise they behave as plain reads and writes. None of the raw borrows is
/// held while user code (getters, setters, subscribers) runs.
#[derive(Clone, Default)]
pub struct ObjectRef(MutRc<ObjectData>);

impl ObjectRef {
  pub fn new() -> Self { Self::default() }

  /// A framework instance record.
  pub fn instance() -> Self {
    Self(MutRc::own(ObjectData { kind: ObjectKind::Instance, ..Default::default() }))
  }

  pub fn kind(&self) -> ObjectKind { self.0.rc_deref().kind }

  #[inline]
  pub fn is_plain(&self) -> bool { self.kind() == ObjectKind::Plain }

  #[inline]
  pub fn is_instance(&self) -> bool { self.kind() == ObjectKind::Instance }

  pub fn is_extensible(&self) -> bool { !self.0.rc_deref().sealed }

  /// Forbid adding new keys. Non-extensible records are never observed.
  pub fn prevent_extensions(&self) { self.0.rc_deref_mut().sealed = true; }

  /// Forbid adding keys and make every existing key non-configurable.
  pub fn freeze(&self) {
    let mut data = self.0.rc_deref_mut();
    data.sealed = true;
    data.props.values_mut().for_each(|slot| slot.configurable = false);
  }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { self.0.ptr_eq(&other.0) }

  #[inline]
  pub fn addr(&self) -> usize { self.0.addr() }

  pub fn has_own(&self, key: &str) -> bool { self.0.rc_deref().props.contains_key(key) }

  /// Own enumerable keys, in insertion order.
  pub fn keys(&self) -> Vec<String> {
    self
      .0
      .rc_deref()
      .props
      .iter()
      .filter(|(_, slot)| slot.enumerable)
      .map(|(key, _)| key.clone())
      .collect()
  }

  pub fn len(&self) -> usize { self.0.rc_deref().props.len() }

  pub fn is_empty(&self) -> bool { self.0.rc_deref().props.is_empty() }

  /// Whether `key` is an instrumented (reactive) property.
  pub fn is_reactive(&self, key: &str) -> bool {
    matches!(self.slot(key), Some(PropertySlot { kind: PropertyKind::Reactive(_), .. }))
  }

  /// The observer attached to this record, if it is observed.
  pub fn observer(&self) -> Option<Observer> { self.0.rc_deref().observer.clone() }

  pub(crate) fn attach_observer(&self, observer: Observer) {
    self.0.rc_deref_mut().observer = Some(observer);
  }

  pub(crate) fn slot(&self, key: &str) -> Option<PropertySlot> {
    self.0.rc_deref().props.get(key).cloned()
  }

  /// Install `slot` for `key`, replacing any existing slot in place.
  pub(crate) fn install(&self, key: &str, slot: PropertySlot) -> Result<(), ReactiveError> {
    let mut data = self.0.rc_deref_mut();
    if let Some(existing) = data.props.get_mut(key) {
      *existing = slot;
    } else if data.sealed {
      return Err(ReactiveError::NotExtensible(key.to_owned()));
    } else {
      data.props.insert(key.to_owned(), slot);
    }
    Ok(())
  }

  /// Define or redefine a property.
  pub fn define_property(
    &self, key: impl Into<String>, descriptor: PropertyDescriptor,
  ) -> Result<(), ReactiveError> {
    let key = key.into();
    if self.slot(&key).is_some_and(|slot| !slot.configurable) {
      return Err(ReactiveError::NonConfigurable(key));
    }
    let PropertyDescriptor { kind, enumerable, configurable } = descriptor;
    self.install(&key, PropertySlot { kind, enumerable, configurable })
  }

  /// Add a plain data property without any interception.
  ///
  /// Returns `false` when the key cannot be written (non-configurable or the
  /// record is not extensible).
  pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
    self.define_property(key, PropertyDescriptor::data(value)).is_ok()
  }

  /// Read a property, running the interceptor or accessor if present.
  ///
  /// Missing keys read as [`Value::Undefined`].
  pub fn get(&self, key: &str) -> Value {
    match self.slot(key).map(|slot| slot.kind) {
      Some(PropertyKind::Data(value)) => value,
      Some(PropertyKind::Accessor { get: Some(get), .. }) => get(),
      Some(PropertyKind::Accessor { get: None, .. }) | None => Value::Undefined,
      Some(PropertyKind::Reactive(prop)) => prop.get(),
    }
  }

  /// Write a property the way a plain assignment would.
  ///
  /// Existing instrumented keys go through their setter and notify. Writing a
  /// key that does not exist yet adds a plain, non-reactive data property; use
  /// [`set`](crate::mutation::set) to add a reactive one.
  pub fn put(&self, key: &str, value: impl Into<Value>) {
    let value = value.into();
    match self.slot(key).map(|slot| slot.kind) {
      Some(PropertyKind::Data(_)) => {
        if let Some(slot) = self.0.rc_deref_mut().props.get_mut(key) {
          slot.kind = PropertyKind::Data(value);
        }
      }
      Some(PropertyKind::Accessor { set, .. }) => {
        if let Some(set) = set {
          set(value);
        }
      }
      Some(PropertyKind::Reactive(prop)) => prop.set(value),
      None => {
        let _ = self.install(key, PropertySlot {
          kind: PropertyKind::Data(value),
          enumerable: true,
          configurable: true,
        });
      }
    }
  }

  /// Remove an own property without notifying anyone.
  ///
  /// Returns `Ok(false)` when the key was absent.
  pub fn remove(&self, key: &str) -> Result<bool, ReactiveError> {
    let mut data = self.0.rc_deref_mut();
    let configurable = match data.props.get(key) {
      None => return Ok(false),
      Some(slot) => slot.configurable,
    };
    if !configurable {
      return Err(ReactiveError::NonConfigurable(key.to_owned()));
    }
    data.props.shift_remove(key);
    Ok(true)
  }
}
