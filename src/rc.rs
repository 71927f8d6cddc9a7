//! Shared mutable cells backing tracked containers.
//!
//! Every container in the data graph is an `Rc<RefCell<_>>` so that aliasing
//! (the same object reachable from two properties) is preserved: identity is
//! the allocation, not the contents.

use std::{
  cell::{Ref, RefCell, RefMut},
  rc::Rc,
};

pub trait RcDeref {
  type Target<'a>
  where
    Self: 'a;
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref<'a>(&'a self) -> Self::Target<'a>;
}

pub trait RcDerefMut {
  type Target<'a>
  where
    Self: 'a;
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref_mut<'a>(&'a self) -> Self::Target<'a>;
}

#[derive(Default)]
pub struct MutRc<T>(Rc<RefCell<T>>);

impl<T> MutRc<T> {
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }

  /// Whether both handles point at the same allocation.
  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }

  /// Address of the shared allocation, stable for the lifetime of the cell.
  #[inline]
  pub fn addr(&self) -> usize { Rc::as_ptr(&self.0) as *const () as usize }
}

impl<T> RcDeref for MutRc<T> {
  type Target<'a>
  where
    Self: 'a,
  = Ref<'a, T>;
  #[inline]
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref<'a>(&'a self) -> Self::Target<'a> { self.0.borrow() }
}

impl<T> RcDerefMut for MutRc<T> {
  type Target<'a>
  where
    Self: 'a,
  = RefMut<'a, T>;

  #[inline]
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref_mut<'a>(&'a self) -> Self::Target<'a> { self.0.borrow_mut() }
}

impl<T> Clone for MutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> From<T> for MutRc<T> {
  #[inline]
  fn from(t: T) -> Self { Self::own(t) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clones_share_identity() {
    let a = MutRc::own(vec![1]);
    let b = a.clone();
    b.rc_deref_mut().push(2);
    assert!(a.ptr_eq(&b));
    assert_eq!(a.addr(), b.addr());
    assert_eq!(*a.rc_deref(), vec![1, 2]);
  }

  #[test]
  fn equal_contents_are_distinct() {
    let a = MutRc::own(1);
    let b = MutRc::own(1);
    assert!(!a.ptr_eq(&b));
  }
}
