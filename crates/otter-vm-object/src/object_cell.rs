//! Interior mutability for heap slots.
//!
//! `ObjectCell<T>` wraps a `RefCell<T>` and reports overlapping borrows as
//! [`VmError::InternalError`] instead of panicking, so a native accessor that
//! re-enters an object while it is being mutated fails the operation rather
//! than the process.
//!
//! Cells are confined to the thread that owns the heap; they are neither
//! `Send` nor `Sync`.

use std::cell::{Ref, RefCell, RefMut};
use std::ops::{Deref, DerefMut};

use crate::error::{VmError, VmResult};

/// Single-threaded interior mutability wrapper for a representation.
pub struct ObjectCell<T> {
    value: RefCell<T>,
}

impl<T> ObjectCell<T> {
    /// Create a new `ObjectCell` with the given value.
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
        }
    }

    /// Borrow the value immutably.
    #[inline]
    pub fn borrow(&self) -> VmResult<ObjectCellRef<'_, T>> {
        self.value
            .try_borrow()
            .map(|inner| ObjectCellRef { inner })
            .map_err(|_| VmError::internal("object is being modified"))
    }

    /// Borrow the value mutably.
    #[inline]
    pub fn borrow_mut(&self) -> VmResult<ObjectCellRefMut<'_, T>> {
        self.value
            .try_borrow_mut()
            .map(|inner| ObjectCellRefMut { inner })
            .map_err(|_| VmError::internal("object is already borrowed"))
    }

    /// Swap in a new value, returning the old one.
    pub fn replace(&self, value: T) -> VmResult<T> {
        let mut slot = self.borrow_mut()?;
        Ok(std::mem::replace(&mut *slot, value))
    }

    /// Consume the cell and return the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObjectCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value.try_borrow() {
            Ok(value) => f.debug_struct("ObjectCell").field("value", &*value).finish(),
            Err(_) => f.debug_struct("ObjectCell").field("value", &"<borrowed>").finish(),
        }
    }
}

/// Immutable borrow guard for `ObjectCell<T>`.
pub struct ObjectCellRef<'a, T> {
    inner: Ref<'a, T>,
}

impl<T> Deref for ObjectCellRef<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.inner
    }
}

/// Mutable borrow guard for `ObjectCell<T>`.
pub struct ObjectCellRefMut<'a, T> {
    inner: RefMut<'a, T>,
}

impl<T> Deref for ObjectCellRefMut<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for ObjectCellRefMut<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}
