//! Reactive key addition and removal.
//!
//! Interception works per key, so adding or removing a key on an observed
//! object, or writing an array element, goes unnoticed through plain
//! operations. [`set`] and [`delete`] perform those changes and notify the
//! container's observer.

use crate::{
  error::{self, Diagnostic, MutationKind, ReactiveError},
  reactive::define_reactive,
  value::{ArrayRef, Key, ObjectRef, Value},
};

/// Write `key` on `target` so that the change is tracked.
///
/// - Arrays take index keys only. The array grows as needed and the write goes
///   through an instrumented `splice`.
/// - An existing key is assigned as usual, through its interceptor if it has
///   one.
/// - A new key on an observed object becomes reactive and the object's
///   observer is notified.
/// - A new key on an unobserved object is a plain assignment.
/// - A new key on a framework instance or a root object is reported and
///   assigned without reactivity.
///
/// Returns the value written.
pub fn set(
  target: &Value, key: impl Into<Key>, value: impl Into<Value>,
) -> Result<Value, ReactiveError> {
  let key = key.into();
  let value = value.into();
  match target {
    Value::Array(array) => {
      let index = array_index(key)?;
      set_index(array, index, value.clone());
      Ok(value)
    }
    Value::Object(object) => set_property(object, key.into_name(), value),
    other => Err(invalid_target(MutationKind::Set, other)),
  }
}

/// Remove `key` from `target` so that the change is tracked.
///
/// Removing an array index goes through an instrumented `splice`. Removing a
/// key of an observed object notifies its observer; a missing key is a no-op.
/// On a framework instance or a root object the removal is reported and done
/// without notifying.
pub fn delete(target: &Value, key: impl Into<Key>) -> Result<(), ReactiveError> {
  let key = key.into();
  match target {
    Value::Array(array) => {
      let index = array_index(key)?;
      array.splice(splice_start(index), Some(1), []);
      Ok(())
    }
    Value::Object(object) => delete_property(object, key.into_name()),
    other => Err(invalid_target(MutationKind::Delete, other)),
  }
}

fn array_index(key: Key) -> Result<usize, ReactiveError> {
  key.as_index().ok_or_else(|| ReactiveError::InvalidArrayKey(key.into_name()))
}

fn splice_start(index: usize) -> isize { isize::try_from(index).unwrap_or(isize::MAX) }

fn set_index(array: &ArrayRef, index: usize, value: Value) {
  if index > array.len() {
    array.set_len(index);
  }
  array.splice(splice_start(index), Some(1), [value]);
}

fn set_property(object: &ObjectRef, key: String, value: Value) -> Result<Value, ReactiveError> {
  if object.has_own(&key) {
    object.put(&key, value.clone());
    return Ok(value);
  }

  let observer = object.observer();
  if object.is_instance() || observer.as_ref().is_some_and(|ob| ob.root_count() > 0) {
    error::warn(Diagnostic::RootAddition { key: key.clone() });
    object.put(&key, value.clone());
    return Ok(value);
  }
  let Some(observer) = observer else {
    object.put(&key, value.clone());
    return Ok(value);
  };

  define_reactive(object, &key, Some(value.clone()), None, false)?;
  tracing::trace!(target: "rxtrack", dep = observer.dep().id(), key = %key, "reactive key added");
  observer.dep().notify();
  Ok(value)
}

fn delete_property(object: &ObjectRef, key: String) -> Result<(), ReactiveError> {
  let observer = object.observer();
  if object.is_instance() || observer.as_ref().is_some_and(|ob| ob.root_count() > 0) {
    error::warn(Diagnostic::RootDeletion { key: key.clone() });
    object.remove(&key)?;
    return Ok(());
  }
  if !object.remove(&key)? {
    return Ok(());
  }
  if let Some(observer) = observer {
    tracing::trace!(target: "rxtrack", dep = observer.dep().id(), key = %key, "reactive key removed");
    observer.dep().notify();
  }
  Ok(())
}

fn invalid_target(op: MutationKind, target: &Value) -> ReactiveError {
  let found = target.type_name();
  error::warn(Diagnostic::InvalidTarget { op, found });
  ReactiveError::InvalidTarget { op, found }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::{
    array, config, object,
    observer::{observe, Observer},
    subscriber::{FnSubscriber, Subscriber},
    target::track,
  };

  fn watch(observer: &Observer) -> (Rc<RefCell<usize>>, Rc<dyn Subscriber>) {
    let runs = Rc::new(RefCell::new(0));
    let c_runs = runs.clone();
    let sub: Rc<dyn Subscriber> = FnSubscriber::new(move || *c_runs.borrow_mut() += 1);
    track(sub.clone(), || observer.dep().depend());
    (runs, sub)
  }

  fn capture_warnings() -> Rc<RefCell<Vec<Diagnostic>>> {
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    config::update(|c| {
      c.silent = true;
      c.warn_handler = Some(Rc::new(move |d: &Diagnostic| c_seen.borrow_mut().push(d.clone())));
    });
    seen
  }

  #[test]
  fn adds_reactive_key_to_observed_object() {
    let object = object! { "a" => 1 };
    let value = Value::from(object.clone());
    let (runs, _sub) = watch(&observe(&value, false).unwrap());

    let written = set(&value, "b", 2).unwrap();
    assert_eq!(written.as_number(), Some(2.));
    assert!(object.is_reactive("b"));
    assert_eq!(*runs.borrow(), 1);
  }

  #[test]
  fn existing_key_is_plain_write() {
    let object = object! { "a" => 1 };
    let value = Value::from(object.clone());
    let (runs, _sub) = watch(&observe(&value, false).unwrap());

    set(&value, "a", 5).unwrap();
    assert_eq!(object.get("a").as_number(), Some(5.));
    assert_eq!(*runs.borrow(), 0);
  }

  #[test]
  fn unobserved_object_gets_plain_key() {
    let object = ObjectRef::new();
    set(&object.clone().into(), "x", 1).unwrap();
    assert!(object.has_own("x"));
    assert!(!object.is_reactive("x"));
  }

  #[test]
  fn root_addition_is_reported_and_not_reactive() {
    let seen = capture_warnings();
    let object = ObjectRef::new();
    let value = Value::from(object.clone());
    let (runs, _sub) = watch(&observe(&value, true).unwrap());

    set(&value, "late", 1).unwrap();
    set(&ObjectRef::instance().into(), "late", 1).unwrap();
    config::reset();

    assert_eq!(object.get("late").as_number(), Some(1.));
    assert!(!object.is_reactive("late"));
    assert_eq!(*runs.borrow(), 0);
    assert_eq!(*seen.borrow(), vec![
      Diagnostic::RootAddition { key: "late".into() },
      Diagnostic::RootAddition { key: "late".into() },
    ]);
  }

  #[test]
  fn array_index_write_notifies_and_grows() {
    let list = array![1];
    let value = Value::from(list.clone());
    let (runs, _sub) = watch(&observe(&value, false).unwrap());

    set(&value, 0usize, 7).unwrap();
    assert_eq!(list.get(0).as_number(), Some(7.));
    set(&value, "3", 9).unwrap();
    assert_eq!(list.len(), 4);
    assert!(matches!(list.get(2), Value::Undefined));
    assert_eq!(list.get(3).as_number(), Some(9.));
    assert_eq!(*runs.borrow(), 2);
  }

  #[test]
  fn array_rejects_named_keys() {
    let value = Value::from(array![1]);
    assert_eq!(set(&value, "len", 1).unwrap_err(), ReactiveError::InvalidArrayKey("len".into()));
    assert_eq!(delete(&value, "-1").unwrap_err(), ReactiveError::InvalidArrayKey("-1".into()));
  }

  #[test]
  fn array_rejects_indices_past_max_length() {
    let list = array![1];
    let value = Value::from(list.clone());
    observe(&value, false);

    let err = set(&value, usize::MAX, 2).unwrap_err();
    assert_eq!(err, ReactiveError::InvalidArrayKey(usize::MAX.to_string()));
    let err = set(&value, "1e15", 2).unwrap_err();
    assert_eq!(err, ReactiveError::InvalidArrayKey("1e15".into()));
    assert!(delete(&value, Key::MAX_INDEX + 1).is_err());
    assert_eq!(list.len(), 1);
  }

  #[test]
  fn object_written_at_index_is_observed() {
    let list = array![1];
    let value = Value::from(list.clone());
    let (runs, _sub) = watch(&observe(&value, false).unwrap());

    let item = object! { "title" => "a", "tags" => array!["x"] };
    set(&value, 0usize, item.clone()).unwrap();
    assert!(item.observer().is_some());
    assert!(item.is_reactive("title"));
    assert!(item.is_reactive("tags"));
    assert!(item.get("tags").as_array().unwrap().observer().is_some());
    assert!(list.get(0).as_object().unwrap().ptr_eq(&item));
    assert_eq!(*runs.borrow(), 1);
  }

  #[test]
  fn invalid_targets() {
    let seen = capture_warnings();
    let err = set(&Value::Undefined, "a", 1).unwrap_err();
    let del = delete(&Value::from(3), "a").unwrap_err();
    config::reset();

    assert_eq!(err, ReactiveError::InvalidTarget { op: MutationKind::Set, found: "undefined" });
    assert_eq!(del, ReactiveError::InvalidTarget { op: MutationKind::Delete, found: "number" });
    assert_eq!(seen.borrow().len(), 2);
  }

  #[test]
  fn delete_notifies_observed_object() {
    let object = object! { "a" => 1, "b" => 2 };
    let value = Value::from(object.clone());
    let (runs, _sub) = watch(&observe(&value, false).unwrap());

    delete(&value, "a").unwrap();
    assert!(!object.has_own("a"));
    assert_eq!(*runs.borrow(), 1);

    delete(&value, "missing").unwrap();
    assert_eq!(*runs.borrow(), 1);
  }

  #[test]
  fn root_deletion_is_reported_without_notify() {
    let seen = capture_warnings();
    let object = object! { "a" => 1 };
    let value = Value::from(object.clone());
    let (runs, _sub) = watch(&observe(&value, true).unwrap());

    delete(&value, "a").unwrap();
    config::reset();

    assert!(!object.has_own("a"));
    assert_eq!(*runs.borrow(), 0);
    assert_eq!(*seen.borrow(), vec![Diagnostic::RootDeletion { key: "a".into() }]);
  }

  #[test]
  fn delete_non_configurable_fails() {
    let object = object! { "a" => 1 };
    object.freeze();
    let err = delete(&object.into(), "a").unwrap_err();
    assert_eq!(err, ReactiveError::NonConfigurable("a".into()));
  }

  #[test]
  fn array_delete_splices() {
    let list = array![1, 2, 3];
    let value = Value::from(list.clone());
    let (runs, _sub) = watch(&observe(&value, false).unwrap());

    delete(&value, 1usize).unwrap();
    let rest: Vec<f64> = list.to_vec().iter().filter_map(Value::as_number).collect();
    assert_eq!(rest, vec![1., 3.]);
    assert_eq!(*runs.borrow(), 1);
  }
}
