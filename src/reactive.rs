//! The property interceptor.
//!
//! [`define_reactive`] replaces one object key with a trapped get/set pair
//! that owns its own [`Dep`]. Reads made while a subscriber is active register
//! it; writes of a different value notify.

use std::{cell::RefCell, rc::Rc};

use smallvec::SmallVec;

use crate::{
  dep::Dep,
  error::ReactiveError,
  observer::{observe, Observer},
  target,
  value::{ArrayRef, Getter, ObjectRef, PropertyKind, PropertySlot, Setter, Value},
};

/// Hook run before an instrumented write lands, e.g. to warn that a value
/// owned by someone else is being mutated.
pub type CustomSetter = Rc<dyn Fn()>;

pub(crate) struct ReactiveProperty {
  dep: Dep,
  slot: RefCell<Value>,
  getter: Option<Getter>,
  setter: Option<Setter>,
  child: RefCell<Option<Observer>>,
  custom_setter: Option<CustomSetter>,
  shallow: bool,
}

/// Instrument `key` on `object`.
///
/// - A non-configurable key is left untouched.
/// - A pre-existing accessor pair is kept and delegated to.
/// - Without `value`, the current value is read (through the getter when there
///   is one with a setter, or directly for data keys).
/// - Unless `shallow`, the value is observed so its own contents are tracked.
///
/// A key with a getter but no setter silently drops writes. This is
/// surprising but intentional: the accessor is read-only and existing users
/// rely on assignments to it being ignored rather than failing.
pub fn define_reactive(
  object: &ObjectRef, key: &str, value: Option<Value>, custom_setter: Option<CustomSetter>,
  shallow: bool,
) -> Result<(), ReactiveError> {
  let existing = object.slot(key);
  if existing.as_ref().is_some_and(|slot| !slot.configurable) {
    return Ok(());
  }

  let (getter, setter) = match existing.map(|slot| slot.kind) {
    Some(PropertyKind::Accessor { get, set }) => (get, set),
    Some(PropertyKind::Reactive(prop)) => delegate_to(prop),
    Some(PropertyKind::Data(_)) | None => (None, None),
  };

  let value = match value {
    Some(value) => value,
    None if getter.is_none() || setter.is_some() => object.get(key),
    None => Value::Undefined,
  };
  let child = if shallow { None } else { observe(&value, false) };

  let prop = ReactiveProperty {
    dep: Dep::new(),
    slot: RefCell::new(value),
    getter,
    setter,
    child: RefCell::new(child),
    custom_setter,
    shallow,
  };
  object.install(key, PropertySlot {
    kind: PropertyKind::Reactive(Rc::new(prop)),
    enumerable: true,
    configurable: true,
  })
}

/// Wrap an already instrumented key so a redefinition stacks on top of it.
fn delegate_to(prop: Rc<ReactiveProperty>) -> (Option<Getter>, Option<Setter>) {
  let get = prop.clone();
  let getter: Getter = Rc::new(move || get.get());
  let setter: Setter = Rc::new(move |value: Value| prop.set(value));
  (Some(getter), Some(setter))
}

impl ReactiveProperty {
  fn current(&self) -> Value {
    match &self.getter {
      Some(getter) => getter(),
      None => self.slot.borrow().clone(),
    }
  }

  pub(crate) fn get(&self) -> Value {
    let value = self.current();
    if target::is_tracking() {
      self.dep.depend();
      let child = self.child.borrow().clone();
      if let Some(child) = child {
        child.dep().depend();
        if let Value::Array(array) = &value {
          depend_array(array, &mut SmallVec::new());
        }
      }
    }
    value
  }

  pub(crate) fn set(&self, value: Value) {
    if Value::is_unchanged(&self.current(), &value) {
      return;
    }
    if let Some(hook) = &self.custom_setter {
      hook();
    }
    match (&self.getter, &self.setter) {
      (_, Some(setter)) => setter(value.clone()),
      (Some(_), None) => return,
      (None, None) => *self.slot.borrow_mut() = value.clone(),
    }
    let child = if self.shallow { None } else { observe(&value, false) };
    *self.child.borrow_mut() = child;
    self.dep.notify();
  }

  #[cfg(test)]
  pub(crate) fn dep(&self) -> &Dep { &self.dep }
}

/// Register on every observed element of `array`, descending into nested
/// arrays: element reads are not intercepted, so touching the array counts as
/// touching its elements.
fn depend_array(array: &ArrayRef, visited: &mut SmallVec<[usize; 4]>) {
  if visited.contains(&array.addr()) {
    return;
  }
  visited.push(array.addr());
  for item in array.to_vec() {
    if let Some(observer) = item.observer() {
      observer.dep().depend();
    }
    if let Value::Array(nested) = &item {
      depend_array(nested, visited);
    }
  }
}
