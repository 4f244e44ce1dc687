//! Move-only buffer whose lifetime is checked by the compiler.
//!
//! [`OwnedSptr<T>`] keeps the bounds check of [`Sptr`](crate::Sptr) but
//! drops the runtime validity flag: [`release`](OwnedSptr::release) takes
//! the handle by value, so use after release and double release are
//! rejected at compile time.
//!
//! ```compile_fail
//! let mut buf = sptr::OwnedSptr::<i32>::new(4);
//! buf.release();
//! *buf.at(0) = 1;
//! ```
//!
//! ```compile_fail
//! let buf = sptr::OwnedSptr::<i32>::new(4);
//! buf.release();
//! buf.release();
//! ```

use std::fmt;
use std::mem::{self, ManuallyDrop};
use std::panic::Location;

use crate::buffer::Sptr;
use crate::error::{Site, SptrError};
use crate::fatal::or_fail;
#[cfg(not(feature = "unchecked"))]
use crate::index::checked_offset;
use crate::index::ElementIndex;
use crate::raw::RawBuf;

/// An owning, fixed-capacity buffer released by value.
///
/// Unlike [`Sptr`], this type frees its storage on drop;
/// [`release`](OwnedSptr::release) is the explicit spelling of the same thing.
#[must_use]
pub struct OwnedSptr<T> {
    raw: RawBuf<T>,
}

impl<T> OwnedSptr<T> {
    /// Allocate `count` default-initialised elements.
    #[track_caller]
    pub fn new(count: usize) -> Self
    where
        T: Default,
    {
        or_fail(Self::alloc(count, |_| T::default(), Location::caller()))
    }

    /// Fallible form of [`new`](OwnedSptr::new).
    #[track_caller]
    pub fn try_new(count: usize) -> Result<Self, SptrError>
    where
        T: Default,
    {
        Self::alloc(count, |_| T::default(), Location::caller())
    }

    /// Allocate `count` elements, initialising slot `i` with `init(i)`.
    #[track_caller]
    pub fn from_fn(count: usize, init: impl FnMut(usize) -> T) -> Self {
        or_fail(Self::alloc(count, init, Location::caller()))
    }

    /// Fallible form of [`from_fn`](OwnedSptr::from_fn).
    #[track_caller]
    pub fn try_from_fn(count: usize, init: impl FnMut(usize) -> T) -> Result<Self, SptrError> {
        Self::alloc(count, init, Location::caller())
    }

    fn alloc(count: usize, init: impl FnMut(usize) -> T, site: Site) -> Result<Self, SptrError> {
        RawBuf::try_from_fn(count, init)
            .map(|raw| Self { raw })
            .map_err(|_| SptrError::AllocationFailed {
                bytes: mem::size_of::<T>().checked_mul(count),
                site,
            })
    }

    /// Number of elements.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the capacity is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Mutable reference to the element at `index`.
    ///
    /// Terminates the process on an out-of-range index in the checked build.
    /// In the unchecked build an out-of-range index is undefined behaviour.
    #[track_caller]
    #[inline]
    pub fn at<I: ElementIndex>(&mut self, index: I) -> &mut T {
        or_fail(self.try_at(index))
    }

    /// Fallible form of [`at`](OwnedSptr::at).
    #[cfg(not(feature = "unchecked"))]
    #[track_caller]
    #[inline]
    #[allow(unsafe_code)]
    pub fn try_at<I: ElementIndex>(&mut self, index: I) -> Result<&mut T, SptrError> {
        match checked_offset(index, self.raw.len()) {
            // SAFETY: offset < len; the storage lives as long as `self`.
            Some(offset) => Ok(unsafe { self.raw.slot(offset) }),
            None => Err(SptrError::OutOfRange {
                index: index.signed(),
                capacity: self.raw.len(),
                site: Location::caller(),
            }),
        }
    }

    /// Fallible form of [`at`](OwnedSptr::at). Never fails in this build.
    ///
    /// Bounds are not validated: a negative or out-of-range index is
    /// undefined behaviour.
    #[cfg(feature = "unchecked")]
    #[track_caller]
    #[inline(always)]
    #[allow(unsafe_code)]
    pub fn try_at<I: ElementIndex>(&mut self, index: I) -> Result<&mut T, SptrError> {
        // SAFETY: none. The unchecked build hands bounds to the caller.
        Ok(unsafe { self.raw.slot(index.wrapping_offset()) })
    }

    /// Drop the elements and free the storage.
    pub fn release(self) {
        drop(self);
    }

    /// Hand the storage over to a runtime-tracked [`Sptr`].
    pub fn into_sptr(self) -> Sptr<T> {
        let mut this = ManuallyDrop::new(self);
        let raw = mem::replace(&mut this.raw, RawBuf::dangling());
        Sptr::from_raw(raw)
    }
}

impl<T> Drop for OwnedSptr<T> {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        // SAFETY: storage is freed only here, once, when the owner goes away.
        unsafe { self.raw.free() };
    }
}

impl<T> fmt::Debug for OwnedSptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedSptr")
            .field("capacity", &self.capacity())
            .finish()
    }
}
