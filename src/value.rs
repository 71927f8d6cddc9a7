//! The tracked data graph.
//!
//! Values form a closed set: primitives, two container kinds (`Object` and
//! `Array`) that may be placed under observation, and `Opaque` host values that
//! are carried around but never instrumented.

mod array;
mod object;

use std::{any::Any, fmt, rc::Rc};

use smallvec::SmallVec;

pub use array::ArrayRef;
pub use object::{Getter, ObjectKind, ObjectRef, PropertyDescriptor, Setter};
pub(crate) use object::{PropertyKind, PropertySlot};

use crate::observer::Observer;

/// A value stored in a tracked property or array slot.
#[derive(Clone, Default)]
pub enum Value {
  #[default]
  Undefined,
  Null,
  Bool(bool),
  Number(f64),
  Str(Rc<str>),
  Array(ArrayRef),
  Object(ObjectRef),
  Opaque(Opaque),
}

/// A host value that is never observed.
#[derive(Clone)]
pub struct Opaque(Rc<dyn Any>);

impl Opaque {
  pub fn new<T: Any>(value: T) -> Self { Self(Rc::new(value)) }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> { self.0.downcast_ref() }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool {
    Rc::as_ptr(&self.0) as *const () == Rc::as_ptr(&other.0) as *const ()
  }
}

impl fmt::Debug for Opaque {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Opaque(..)") }
}

impl Value {
  /// Strict equality: primitives by value, containers by identity.
  ///
  /// `NaN` is never strictly equal to itself; see [`Value::is_unchanged`].
  pub fn strict_eq(&self, other: &Value) -> bool {
    match (self, other) {
      (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Number(a), Value::Number(b)) => a == b,
      (Value::Str(a), Value::Str(b)) => a == b,
      (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
      (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
      (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),
      _ => false,
    }
  }

  /// Whether writing `new` over `old` is a no-op for change notification.
  pub fn is_unchanged(old: &Value, new: &Value) -> bool {
    old.strict_eq(new) || (old.is_nan() && new.is_nan())
  }

  #[inline]
  pub fn is_nan(&self) -> bool { matches!(self, Value::Number(n) if n.is_nan()) }

  #[inline]
  pub fn is_nullish(&self) -> bool { matches!(self, Value::Undefined | Value::Null) }

  pub fn as_object(&self) -> Option<&ObjectRef> {
    match self {
      Value::Object(object) => Some(object),
      _ => None,
    }
  }

  pub fn as_array(&self) -> Option<&ArrayRef> {
    match self {
      Value::Array(array) => Some(array),
      _ => None,
    }
  }

  pub fn as_number(&self) -> Option<f64> {
    match self {
      Value::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Str(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }

  /// The observer attached to this value, if it is an observed container.
  pub fn observer(&self) -> Option<Observer> {
    match self {
      Value::Object(object) => object.observer(),
      Value::Array(array) => array.observer(),
      _ => None,
    }
  }

  /// Short type label used in diagnostics.
  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Undefined => "undefined",
      Value::Null => "null",
      Value::Bool(_) => "boolean",
      Value::Number(_) => "number",
      Value::Str(_) => "string",
      Value::Array(_) => "array",
      Value::Object(_) => "object",
      Value::Opaque(_) => "opaque",
    }
  }

  /// String conversion used by the default array sort order.
  ///
  /// Arrays join their elements with `,`; an array reached again while it is
  /// being joined renders as an empty string.
  pub fn to_display_string(&self) -> String { self.display_with(&mut SmallVec::new()) }

  fn display_with(&self, joining: &mut SmallVec<[usize; 4]>) -> String {
    match self {
      Value::Undefined => "undefined".into(),
      Value::Null => "null".into(),
      Value::Bool(b) => b.to_string(),
      Value::Number(n) => number_to_string(*n),
      Value::Str(s) => s.to_string(),
      Value::Array(array) => {
        if joining.contains(&array.addr()) {
          return String::new();
        }
        joining.push(array.addr());
        let joined = array
          .to_vec()
          .iter()
          .map(|v| if v.is_nullish() { String::new() } else { v.display_with(joining) })
          .collect::<Vec<_>>()
          .join(",");
        joining.pop();
        joined
      }
      Value::Object(_) | Value::Opaque(_) => "[object Object]".into(),
    }
  }
}

fn number_to_string(n: f64) -> String {
  if n.is_nan() {
    "NaN".into()
  } else if n.is_infinite() {
    if n > 0. { "Infinity".into() } else { "-Infinity".into() }
  } else if n == 0. {
    "0".into()
  } else {
    n.to_string()
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Undefined => f.write_str("undefined"),
      Value::Null => f.write_str("null"),
      Value::Bool(b) => write!(f, "{b}"),
      Value::Number(n) => f.write_str(&number_to_string(*n)),
      Value::Str(s) => write!(f, "{s:?}"),
      Value::Array(array) => write!(f, "Array@{:x}", array.addr()),
      Value::Object(object) => write!(f, "Object@{:x}", object.addr()),
      Value::Opaque(opaque) => fmt::Debug::fmt(opaque, f),
    }
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<f64> for Value {
  fn from(n: f64) -> Self { Value::Number(n) }
}

impl From<i32> for Value {
  fn from(n: i32) -> Self { Value::Number(n.into()) }
}

impl From<u32> for Value {
  fn from(n: u32) -> Self { Value::Number(n.into()) }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Value::Str(s.into()) }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Value::Str(s.into()) }
}

impl From<ObjectRef> for Value {
  fn from(object: ObjectRef) -> Self { Value::Object(object) }
}

impl From<ArrayRef> for Value {
  fn from(array: ArrayRef) -> Self { Value::Array(array) }
}

impl From<Opaque> for Value {
  fn from(opaque: Opaque) -> Self { Value::Opaque(opaque) }
}

impl From<Vec<Value>> for Value {
  fn from(items: Vec<Value>) -> Self { Value::Array(ArrayRef::from_vec(items)) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(value: Option<T>) -> Self { value.map_or(Value::Null, Into::into) }
}

/// Key accepted by the mutation helpers: an array index or a property name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
  Index(usize),
  Name(String),
}

impl Key {
  /// Largest array index: array lengths stay below `2^32`.
  pub const MAX_INDEX: usize = u32::MAX as usize - 1;

  /// Interpret the key as an array index.
  ///
  /// Names count as indices when they parse as a finite, non-negative integral
  /// number (`"2"`, `"2.0"`). Indices above [`Key::MAX_INDEX`] are rejected.
  pub fn as_index(&self) -> Option<usize> {
    match self {
      Key::Index(index) => (*index <= Self::MAX_INDEX).then_some(*index),
      Key::Name(name) => {
        let n = name.trim().parse::<f64>().ok()?;
        (n.is_finite() && n >= 0. && n.fract() == 0. && n <= Self::MAX_INDEX as f64)
          .then_some(n as usize)
      }
    }
  }

  pub fn into_name(self) -> String {
    match self {
      Key::Index(index) => index.to_string(),
      Key::Name(name) => name,
    }
  }
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Key::Index(index) => write!(f, "{index}"),
      Key::Name(name) => f.write_str(name),
    }
  }
}

impl From<usize> for Key {
  fn from(index: usize) -> Self { Key::Index(index) }
}

impl From<&str> for Key {
  fn from(name: &str) -> Self { Key::Name(name.to_owned()) }
}

impl From<String> for Key {
  fn from(name: String) -> Self { Key::Name(name) }
}

impl From<&String> for Key {
  fn from(name: &String) -> Self { Key::Name(name.clone()) }
}

/// Build a plain [`ObjectRef`] from `key => value` pairs.
///
/// ```rust
/// use rxtrack::object;
///
/// let point = object! { "x" => 1, "y" => 2 };
/// assert_eq!(point.get("y").as_number(), Some(2.));
/// ```
#[macro_export]
macro_rules! object {
  () => { $crate::value::ObjectRef::new() };
  ($($key:expr => $value:expr),+ $(,)?) => {{
    let object = $crate::value::ObjectRef::new();
    $(object.insert($key, $crate::value::Value::from($value));)+
    object
  }};
}

/// Build an [`ArrayRef`] from a list of values.
#[macro_export]
macro_rules! array {
  ($($value:expr),* $(,)?) => {
    $crate::value::ArrayRef::from_vec(vec![$($crate::value::Value::from($value)),*])
  };
}
