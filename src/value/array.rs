use super::Value;
use crate::{
  observer::Observer,
  rc::{MutRc, RcDeref, RcDerefMut},
};

#[derive(Default)]
pub(crate) struct ArrayData {
  items: Vec<Value>,
  observer: Option<Observer>,
  sealed: bool,
}

/// A shared, ordered sequence.
///
/// Element reads and index writes are plain operations: arrays are tracked as
/// a whole through their observer. The mutating methods (`push`, `pop`,
/// `shift`, `unshift`, `splice`, `sort`, `reverse`) live in
/// [`array_methods`](crate::array_methods) and notify when the array is
/// observed.
#[derive(Clone, Default)]
pub struct ArrayRef(MutRc<ArrayData>);

impl ArrayRef {
  pub fn new() -> Self { Self::default() }

  pub fn from_vec(items: Vec<Value>) -> Self {
    Self(MutRc::own(ArrayData { items, ..Default::default() }))
  }

  pub fn len(&self) -> usize { self.0.rc_deref().items.len() }

  pub fn is_empty(&self) -> bool { self.0.rc_deref().items.is_empty() }

  /// Element at `index`, or [`Value::Undefined`] past the end.
  pub fn get(&self, index: usize) -> Value {
    self.0.rc_deref().items.get(index).cloned().unwrap_or_default()
  }

  /// Snapshot of the current elements.
  pub fn to_vec(&self) -> Vec<Value> { self.0.rc_deref().items.clone() }

  /// Plain index assignment. Does not notify: use
  /// [`set`](crate::mutation::set) for a reactive write.
  pub fn set_index(&self, index: usize, value: impl Into<Value>) {
    let mut data = self.0.rc_deref_mut();
    if index >= data.items.len() {
      data.items.resize(index + 1, Value::Undefined);
    }
    data.items[index] = value.into();
  }

  /// Plain length assignment: truncates, or pads with `undefined`.
  pub fn set_len(&self, len: usize) { self.0.rc_deref_mut().items.resize(len, Value::Undefined); }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { self.0.ptr_eq(&other.0) }

  #[inline]
  pub fn addr(&self) -> usize { self.0.addr() }

  pub fn is_extensible(&self) -> bool { !self.0.rc_deref().sealed }

  /// Mark the array non-extensible so it is never observed.
  pub fn prevent_extensions(&self) { self.0.rc_deref_mut().sealed = true; }

  /// The observer attached to this array, if it is observed.
  pub fn observer(&self) -> Option<Observer> { self.0.rc_deref().observer.clone() }

  pub(crate) fn attach_observer(&self, observer: Observer) {
    self.0.rc_deref_mut().observer = Some(observer);
  }

  /// Run `f` against the raw element storage.
  pub(crate) fn with_items_mut<R>(&self, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
    f(&mut self.0.rc_deref_mut().items)
  }

  pub(crate) fn replace_items(&self, items: Vec<Value>) { self.0.rc_deref_mut().items = items; }
}

impl FromIterator<Value> for ArrayRef {
  fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
    Self::from_vec(iter.into_iter().collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn index_writes_pad_with_undefined() {
    let array = ArrayRef::new();
    array.set_index(2, 7);
    assert_eq!(array.len(), 3);
    assert!(matches!(array.get(0), Value::Undefined));
    assert_eq!(array.get(2).as_number(), Some(7.));
    assert!(matches!(array.get(10), Value::Undefined));
  }

  #[test]
  fn length_assignment() {
    let array = ArrayRef::from_vec(vec![1.into(), 2.into(), 3.into()]);
    array.set_len(1);
    assert_eq!(array.len(), 1);
    array.set_len(3);
    assert!(matches!(array.get(2), Value::Undefined));
  }

  #[test]
  fn collect_into_array() {
    let array: ArrayRef = (0..3).map(|i: i32| Value::from(i)).collect();
    assert_eq!(array.len(), 3);
    assert!(array.observer().is_none());
    assert!(array.is_extensible());
  }
}
