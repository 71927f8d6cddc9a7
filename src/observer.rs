//! Collection observers.
//!
//! [`observe`] attaches an [`Observer`] to an object or array the first time
//! it is seen and returns the attached one afterwards. Attaching happens
//! before the contents are walked, so cyclic graphs terminate: the second
//! visit of a node is an identity check, not a re-traversal.
//!
//! - Objects: every own enumerable key becomes a reactive property.
//! - Arrays: every current element is observed, and the mutating methods start
//!   notifying (see [`array_methods`](crate::array_methods)).

use std::{cell::Cell, fmt, rc::Rc};

use crate::{
  dep::Dep,
  error::{self, Diagnostic},
  reactive::define_reactive,
  value::{ArrayRef, ObjectRef, Value},
};

thread_local! {
  static SHOULD_OBSERVE: Cell<bool> = const { Cell::new(true) };
}

/// Suspend or resume creation of new observers on this thread.
///
/// While suspended, [`observe`] still returns observers that already exist.
pub fn set_observation_enabled(enabled: bool) { SHOULD_OBSERVE.with(|c| c.set(enabled)); }

pub fn is_observation_enabled() -> bool { SHOULD_OBSERVE.with(Cell::get) }

/// Run `f` with observation suspended, restoring the previous state after.
pub fn without_observation<R>(f: impl FnOnce() -> R) -> R {
  struct Restore(bool);
  impl Drop for Restore {
    fn drop(&mut self) { set_observation_enabled(self.0); }
  }

  let _restore = Restore(is_observation_enabled());
  set_observation_enabled(false);
  f()
}

/// The observer attached to one tracked object or array.
///
/// Its dep is notified when the container changes as a whole: a key is added
/// or removed, or an array is mutated through one of its methods.
#[derive(Clone)]
pub struct Observer(Rc<ObserverInner>);

struct ObserverInner {
  dep: Dep,
  root_count: Cell<usize>,
}

impl Observer {
  fn new() -> Self { Self(Rc::new(ObserverInner { dep: Dep::new(), root_count: Cell::new(0) })) }

  #[inline]
  pub fn dep(&self) -> &Dep { &self.0.dep }

  /// How many times the value was observed as a root.
  #[inline]
  pub fn root_count(&self) -> usize { self.0.root_count.get() }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl fmt::Debug for Observer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Observer")
      .field("dep", &self.0.dep)
      .field("root_count", &self.root_count())
      .finish()
  }
}

/// Begin tracking `value`, or return its existing observer.
///
/// Returns `None` for primitives and opaque values, and for containers that
/// have no observer yet when observation is suspended or the container is a
/// framework instance or not extensible. With `as_root` the observer's root
/// count is bumped, which makes [`set`](crate::mutation::set) and
/// [`delete`](crate::mutation::delete) refuse reactive key changes on it.
pub fn observe(value: &Value, as_root: bool) -> Option<Observer> {
  let observer = match value {
    Value::Object(object) => object.observer().or_else(|| observe_object(object)),
    Value::Array(array) => array.observer().or_else(|| observe_new_array(array)),
    _ => return None,
  };
  if as_root {
    if let Some(observer) = &observer {
      let count = observer.root_count() + 1;
      observer.0.root_count.set(count);
      tracing::debug!(target: "rxtrack", dep = observer.dep().id(), count, "root observed");
    }
  }
  observer
}

fn observe_object(object: &ObjectRef) -> Option<Observer> {
  if !is_observation_enabled() || !object.is_plain() || !object.is_extensible() {
    return None;
  }
  let observer = Observer::new();
  object.attach_observer(observer.clone());
  tracing::trace!(target: "rxtrack", dep = observer.dep().id(), "observing object");
  walk(object);
  Some(observer)
}

fn observe_new_array(array: &ArrayRef) -> Option<Observer> {
  if !is_observation_enabled() || !array.is_extensible() {
    return None;
  }
  let observer = Observer::new();
  array.attach_observer(observer.clone());
  tracing::trace!(target: "rxtrack", dep = observer.dep().id(), len = array.len(), "observing array");
  observe_array(&array.to_vec());
  Some(observer)
}

/// Make every own enumerable key of `object` reactive.
fn walk(object: &ObjectRef) {
  for key in object.keys() {
    if let Err(reason) = define_reactive(object, &key, None, None, false) {
      error::warn(Diagnostic::Uninstrumentable { key, reason });
    }
  }
}

/// Observe each of `items`.
pub(crate) fn observe_array(items: &[Value]) {
  for item in items {
    observe(item, false);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{array, object, value::Opaque};

  #[test]
  fn primitives_are_not_observed() {
    for value in [Value::Undefined, Value::Null, 1.into(), "s".into(), true.into()] {
      assert!(observe(&value, false).is_none());
    }
    assert!(observe(&Opaque::new(()).into(), false).is_none());
  }

  #[test]
  fn observation_is_idempotent() {
    let value = Value::from(object! { "a" => 1 });
    let first = observe(&value, false).unwrap();
    let second = observe(&value, false).unwrap();
    assert!(first.ptr_eq(&second));
    assert!(value.observer().unwrap().ptr_eq(&first));
  }

  #[test]
  fn walks_nested_values() {
    let inner = object! { "b" => 1 };
    let list = array![object! { "c" => 2 }];
    let outer = object! { "a" => inner.clone(), "list" => list.clone() };
    observe(&outer.clone().into(), false);

    assert!(outer.is_reactive("a"));
    assert!(outer.is_reactive("list"));
    assert!(inner.observer().is_some());
    assert!(inner.is_reactive("b"));
    assert!(list.observer().is_some());
    assert!(list.get(0).as_object().unwrap().is_reactive("c"));
  }

  #[test]
  fn cycles_terminate() {
    let a = ObjectRef::new();
    let b = object! { "back" => a.clone() };
    a.insert("next", b.clone());
    a.insert("me", a.clone());
    let observer = observe(&a.clone().into(), false).unwrap();
    assert!(b.observer().is_some());
    assert!(a.observer().unwrap().ptr_eq(&observer));
  }

  #[test]
  fn skips_instances_and_sealed_values() {
    assert!(observe(&ObjectRef::instance().into(), false).is_none());

    let sealed = object! { "a" => 1 };
    sealed.prevent_extensions();
    assert!(observe(&sealed.clone().into(), false).is_none());
    assert!(!sealed.is_reactive("a"));

    let frozen = array![1];
    frozen.prevent_extensions();
    assert!(observe(&frozen.into(), false).is_none());
  }

  #[test]
  fn suspended_observation() {
    let fresh = Value::from(object! { "a" => 1 });
    let seen = Value::from(object! { "b" => 2 });
    let existing = observe(&seen, false).unwrap();

    without_observation(|| {
      assert!(!is_observation_enabled());
      assert!(observe(&fresh, false).is_none());
      assert!(observe(&seen, false).unwrap().ptr_eq(&existing));
    });
    assert!(is_observation_enabled());
    assert!(observe(&fresh, false).is_some());
  }

  #[test]
  fn root_count_increments_per_root_call() {
    let value = Value::from(ObjectRef::new());
    assert_eq!(observe(&value, false).unwrap().root_count(), 0);
    observe(&value, true);
    assert_eq!(observe(&value, true).unwrap().root_count(), 2);
  }

  #[test]
  fn hidden_keys_are_not_instrumented() {
    use crate::value::PropertyDescriptor;

    let object = ObjectRef::new();
    object
      .define_property("hidden", PropertyDescriptor::data(1).enumerable(false))
      .unwrap();
    observe(&object.clone().into(), false);
    assert!(!object.is_reactive("hidden"));
  }

  #[test]
  fn bench() { do_bench(); }

  bencher::benchmark_group!(do_bench, bench_observe_tree);

  fn bench_observe_tree(b: &mut bencher::Bencher) {
    b.iter(|| {
      let list: ArrayRef = (0..100)
        .map(|i: i32| Value::from(object! { "id" => i, "tags" => array![i, "tag"] }))
        .collect();
      observe(&list.into(), false)
    });
  }
}
