//! Instrumented array mutators.
//!
//! Element writes on an [`ArrayRef`] are not intercepted, so changes made
//! through the mutating methods are what an observed array reports. Each
//! method runs the plain operation, observes the items it inserted, notifies
//! the array observer's dep, and returns the plain operation's result. On an
//! unobserved array only the plain operation runs.

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::{
  observer::observe_array,
  value::{ArrayRef, Value},
};

/// The mutating methods an observed array reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayMethod {
  Push,
  Pop,
  Shift,
  Unshift,
  Splice,
  Sort,
  Reverse,
}

impl ArrayMethod {
  pub const ALL: [ArrayMethod; 7] = [
    ArrayMethod::Push,
    ArrayMethod::Pop,
    ArrayMethod::Shift,
    ArrayMethod::Unshift,
    ArrayMethod::Splice,
    ArrayMethod::Sort,
    ArrayMethod::Reverse,
  ];

  pub fn name(self) -> &'static str {
    match self {
      ArrayMethod::Push => "push",
      ArrayMethod::Pop => "pop",
      ArrayMethod::Shift => "shift",
      ArrayMethod::Unshift => "unshift",
      ArrayMethod::Splice => "splice",
      ArrayMethod::Sort => "sort",
      ArrayMethod::Reverse => "reverse",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|method| method.name() == name)
  }

  /// Whether the method can add new elements, which then need observing.
  pub fn inserts_items(self) -> bool {
    matches!(self, ArrayMethod::Push | ArrayMethod::Unshift | ArrayMethod::Splice)
  }
}

type Inserted = SmallVec<[Value; 2]>;

impl ArrayRef {
  fn intercept<R>(
    &self, method: ArrayMethod, inserted: &[Value], native: impl FnOnce(&mut Vec<Value>) -> R,
  ) -> R {
    let result = self.with_items_mut(native);
    if let Some(observer) = self.observer() {
      if method.inserts_items() {
        observe_array(inserted);
      }
      tracing::trace!(
        target: "rxtrack",
        dep = observer.dep().id(),
        method = method.name(),
        inserted = inserted.len(),
        "array mutated"
      );
      observer.dep().notify();
    }
    result
  }

  /// Append `items`, returning the new length.
  pub fn push(&self, items: impl IntoIterator<Item = Value>) -> usize {
    let inserted: Inserted = items.into_iter().collect();
    self.intercept(ArrayMethod::Push, &inserted, |vec| {
      vec.extend(inserted.iter().cloned());
      vec.len()
    })
  }

  pub fn pop(&self) -> Option<Value> { self.intercept(ArrayMethod::Pop, &[], Vec::pop) }

  pub fn shift(&self) -> Option<Value> {
    self.intercept(ArrayMethod::Shift, &[], |vec| (!vec.is_empty()).then(|| vec.remove(0)))
  }

  /// Prepend `items` keeping their order, returning the new length.
  pub fn unshift(&self, items: impl IntoIterator<Item = Value>) -> usize {
    let inserted: Inserted = items.into_iter().collect();
    self.intercept(ArrayMethod::Unshift, &inserted, |vec| {
      vec.splice(0..0, inserted.iter().cloned());
      vec.len()
    })
  }

  /// Remove `delete_count` elements at `start` and insert `items` there,
  /// returning the removed elements.
  ///
  /// A negative `start` counts from the end. Both bounds are clamped to the
  /// array; `None` deletes through the end.
  pub fn splice(
    &self, start: isize, delete_count: Option<usize>, items: impl IntoIterator<Item = Value>,
  ) -> Vec<Value> {
    let inserted: Inserted = items.into_iter().collect();
    self.intercept(ArrayMethod::Splice, &inserted, |vec| {
      let len = vec.len();
      let start = if start < 0 {
        len.saturating_sub(start.unsigned_abs())
      } else {
        (start as usize).min(len)
      };
      let end = match delete_count {
        Some(count) => start + count.min(len - start),
        None => len,
      };
      vec.splice(start..end, inserted.iter().cloned()).collect()
    })
  }

  /// Sort in the default order: `undefined` last, everything else by its
  /// string form. The sort is stable.
  pub fn sort(&self) { self.sort_by(default_order) }

  /// Sort with `compare`. The comparator runs on a copy of the elements, so it
  /// may read the array itself. The sorted copy then replaces the contents
  /// wholesale: anything the comparator writes to this array is discarded.
  pub fn sort_by(&self, mut compare: impl FnMut(&Value, &Value) -> Ordering) {
    let mut sorted = self.to_vec();
    sorted.sort_by(&mut compare);
    self.intercept(ArrayMethod::Sort, &[], |vec| *vec = sorted);
  }

  pub fn reverse(&self) { self.intercept(ArrayMethod::Reverse, &[], |vec| vec.reverse()) }

  /// Call `method` with loosely typed arguments and return its result as a
  /// [`Value`].
  ///
  /// - `push` / `unshift`: every argument is inserted; returns the new length.
  /// - `pop` / `shift`: arguments are ignored; returns the removed element or
  ///   `undefined`.
  /// - `splice`: `start`, an optional delete count, then the items to insert;
  ///   returns the removed elements as a new array.
  /// - `sort` / `reverse`: returns the array itself.
  pub fn invoke(&self, method: ArrayMethod, args: Vec<Value>) -> Value {
    match method {
      ArrayMethod::Push => (self.push(args) as f64).into(),
      ArrayMethod::Unshift => (self.unshift(args) as f64).into(),
      ArrayMethod::Pop => self.pop().unwrap_or_default(),
      ArrayMethod::Shift => self.shift().unwrap_or_default(),
      ArrayMethod::Splice => {
        let mut args = args.into_iter();
        let start = args.next().and_then(|v| v.as_number()).map_or(0, integer_arg);
        let delete_count = match args.next() {
          None => None,
          Some(count) => Some(count.as_number().map_or(0, integer_arg).max(0) as usize),
        };
        ArrayRef::from_vec(self.splice(start, delete_count, args)).into()
      }
      ArrayMethod::Sort => {
        self.sort();
        self.clone().into()
      }
      ArrayMethod::Reverse => {
        self.reverse();
        self.clone().into()
      }
    }
  }
}

/// Truncate a numeric argument the way index arguments are read; NaN reads
/// as zero.
fn integer_arg(n: f64) -> isize {
  if n.is_nan() {
    0
  } else {
    n.trunc() as isize
  }
}

fn default_order(a: &Value, b: &Value) -> Ordering {
  match (a, b) {
    (Value::Undefined, Value::Undefined) => Ordering::Equal,
    (Value::Undefined, _) => Ordering::Greater,
    (_, Value::Undefined) => Ordering::Less,
    _ => a.to_display_string().cmp(&b.to_display_string()),
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::{
    array, object,
    observer::observe,
    subscriber::{FnSubscriber, Subscriber},
    target::track,
  };

  fn numbers(array: &ArrayRef) -> Vec<f64> {
    array.to_vec().iter().filter_map(Value::as_number).collect()
  }

  /// An observed array plus a log of the notifications its dep delivered.
  fn watched(array: &ArrayRef) -> (Rc<RefCell<Vec<usize>>>, Rc<dyn Subscriber>) {
    let observer = observe(&array.clone().into(), false).unwrap();
    let log = Rc::new(RefCell::new(vec![]));
    let c_log = log.clone();
    let c_array = array.clone();
    let sub: Rc<dyn Subscriber> = FnSubscriber::new(move || c_log.borrow_mut().push(c_array.len()));
    track(sub.clone(), || observer.dep().depend());
    (log, sub)
  }

  #[test]
  fn method_table() {
    assert_eq!(ArrayMethod::ALL.len(), 7);
    for method in ArrayMethod::ALL {
      assert_eq!(ArrayMethod::from_name(method.name()), Some(method));
    }
    assert_eq!(ArrayMethod::from_name("fill"), None);
    assert!(ArrayMethod::Splice.inserts_items());
    assert!(!ArrayMethod::Sort.inserts_items());
  }

  #[test]
  fn push_notifies_once_and_observes_inserted() {
    let list = array![1];
    let (log, _sub) = watched(&list);
    let item = object! { "a" => 1 };

    assert_eq!(list.push([Value::from(2), item.clone().into()]), 3);
    assert_eq!(*log.borrow(), vec![3]);
    assert!(item.observer().is_some());
    assert!(item.is_reactive("a"));
  }

  #[test]
  fn unobserved_arrays_only_mutate() {
    let list = array![1, 2];
    let item = object! { "a" => 1 };
    list.push([item.clone().into()]);
    assert_eq!(list.len(), 3);
    assert!(list.observer().is_none());
    assert!(item.observer().is_none());
  }

  #[test]
  fn pop_and_shift() {
    let list = array![1, 2, 3];
    let (log, _sub) = watched(&list);
    assert_eq!(list.pop().and_then(|v| v.as_number()), Some(3.));
    assert_eq!(list.shift().and_then(|v| v.as_number()), Some(1.));
    assert_eq!(numbers(&list), vec![2.]);
    assert_eq!(*log.borrow(), vec![2, 1]);

    let empty = ArrayRef::new();
    assert!(empty.pop().is_none());
    assert!(empty.shift().is_none());
  }

  #[test]
  fn mutation_on_empty_observed_array_still_notifies() {
    let list = ArrayRef::new();
    let (log, _sub) = watched(&list);
    assert!(list.pop().is_none());
    assert_eq!(log.borrow().len(), 1);
  }

  #[test]
  fn unshift_keeps_argument_order() {
    let list = array![3];
    let (log, _sub) = watched(&list);
    assert_eq!(list.unshift([Value::from(1), Value::from(2)]), 3);
    assert_eq!(numbers(&list), vec![1., 2., 3.]);
    assert_eq!(log.borrow().len(), 1);
  }

  #[test]
  fn splice_clamps_like_js() {
    let list = array![0, 1, 2, 3, 4];
    let removed = list.splice(-2, Some(1), [Value::from(9)]);
    assert_eq!(removed.iter().filter_map(Value::as_number).collect::<Vec<_>>(), vec![3.]);
    assert_eq!(numbers(&list), vec![0., 1., 2., 9., 4.]);

    let removed = list.splice(10, Some(3), [Value::from(5)]);
    assert!(removed.is_empty());
    assert_eq!(numbers(&list), vec![0., 1., 2., 9., 4., 5.]);

    let removed = list.splice(-100, Some(2), []);
    assert_eq!(removed.len(), 2);
    assert_eq!(numbers(&list), vec![2., 9., 4., 5.]);

    let removed = list.splice(1, None, []);
    assert_eq!(removed.len(), 3);
    assert_eq!(numbers(&list), vec![2.]);
  }

  #[test]
  fn splice_observes_inserted_only() {
    let list = array![object! { "old" => 1 }];
    let (log, _sub) = watched(&list);
    let fresh = object! { "new" => 1 };
    list.splice(0, Some(0), [fresh.clone().into()]);
    assert!(fresh.is_reactive("new"));
    assert_eq!(log.borrow().len(), 1);
  }

  #[test]
  fn default_sort_order() {
    let list = ArrayRef::from_vec(vec![
      Value::Undefined,
      10.into(),
      "b".into(),
      9.into(),
      Value::Null,
      "a".into(),
    ]);
    let (log, _sub) = watched(&list);
    list.sort();
    let sorted: Vec<String> = list.to_vec().iter().map(Value::to_display_string).collect();
    assert_eq!(sorted, vec!["10", "9", "a", "b", "null", "undefined"]);
    assert_eq!(log.borrow().len(), 1);
  }

  #[test]
  fn sorting_an_array_that_contains_itself() {
    let list = ArrayRef::new();
    list.set_index(0, list.clone());
    list.set_index(1, 1);
    let (log, _sub) = watched(&list);
    list.sort();
    // The self reference displays as ",1", which orders before "1".
    assert!(list.get(0).as_array().unwrap().ptr_eq(&list));
    assert_eq!(list.get(1).as_number(), Some(1.));
    assert_eq!(log.borrow().len(), 1);
  }

  #[test]
  fn writes_from_the_comparator_are_discarded() {
    let list = array![2, 1];
    let c_list = list.clone();
    list.sort_by(move |a, b| {
      c_list.set_index(5, 9);
      a.as_number().partial_cmp(&b.as_number()).unwrap_or(Ordering::Equal)
    });
    assert_eq!(numbers(&list), vec![1., 2.]);
  }

  #[test]
  fn sort_by_may_read_the_array() {
    let list = array![3, 1, 2];
    let (log, _sub) = watched(&list);
    let c_list = list.clone();
    list.sort_by(move |a, b| {
      assert_eq!(c_list.len(), 3);
      a.as_number().partial_cmp(&b.as_number()).unwrap_or(Ordering::Equal)
    });
    assert_eq!(numbers(&list), vec![1., 2., 3.]);
    assert_eq!(log.borrow().len(), 1);
  }

  #[test]
  fn reverse_notifies() {
    let list = array![1, 2, 3];
    let (log, _sub) = watched(&list);
    list.reverse();
    assert_eq!(numbers(&list), vec![3., 2., 1.]);
    assert_eq!(log.borrow().len(), 1);
  }

  #[test]
  fn invoke_by_name() {
    let list = array![1, 2, 3];
    let method = ArrayMethod::from_name("splice").unwrap();
    let removed = list.invoke(method, vec![1.into(), 1.into(), "x".into()]);
    let removed = removed.as_array().unwrap();
    assert_eq!(numbers(removed), vec![2.]);
    assert_eq!(list.get(1).as_str(), Some("x"));

    assert_eq!(list.invoke(ArrayMethod::Push, vec![4.into()]).as_number(), Some(4.));
    assert!(matches!(ArrayRef::new().invoke(ArrayMethod::Pop, vec![]), Value::Undefined));
    let same = list.invoke(ArrayMethod::Reverse, vec![]);
    assert!(same.as_array().unwrap().ptr_eq(&list));
  }
}
