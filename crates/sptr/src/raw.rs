//! Owning raw allocation behind every buffer handle.
//!
//! All raw-pointer work lives here. [`RawBuf`] owns a boxed slice that has
//! been turned into a bare pointer, so that freeing it is an explicit step
//! instead of a `Drop`, and so that the unchecked build can reach elements
//! without any bounds test. Callers elsewhere in the crate invoke the two
//! `unsafe fn`s from individually allowed blocks, each with a `// SAFETY:`
//! note.

#![allow(unsafe_code)]

use std::collections::TryReserveError;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

/// A heap allocation of exactly `len` initialised `T`s.
///
/// Has no `Drop` impl: the storage lives until [`free`](RawBuf::free) is
/// called, or leaks.
pub(crate) struct RawBuf<T> {
    ptr: NonNull<T>,
    len: usize,
    _owns: PhantomData<T>,
}

impl<T> RawBuf<T> {
    /// Allocate `len` elements, initialising slot `i` with `init(i)`.
    pub(crate) fn try_from_fn(
        len: usize,
        init: impl FnMut(usize) -> T,
    ) -> Result<Self, TryReserveError> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.extend((0..len).map(init));
        let boxed = Box::into_raw(data.into_boxed_slice());
        // SAFETY: Box::into_raw never returns null.
        let ptr = unsafe { NonNull::new_unchecked(boxed.cast::<T>()) };
        Ok(Self {
            ptr,
            len,
            _owns: PhantomData,
        })
    }

    /// An empty, never-allocated buffer.
    pub(crate) const fn dangling() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            _owns: PhantomData,
        }
    }

    /// Number of elements.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Mutable reference to the element at `offset`.
    ///
    /// # Safety
    ///
    /// `offset < self.len()` and the buffer has not been freed.
    #[inline(always)]
    pub(crate) unsafe fn slot(&mut self, offset: usize) -> &mut T {
        // SAFETY: the caller guarantees the offset is in bounds of a live
        // allocation; `&mut self` makes the returned borrow exclusive.
        unsafe { &mut *self.ptr.as_ptr().add(offset) }
    }

    /// Drop every element and release the allocation.
    ///
    /// # Safety
    ///
    /// The buffer came from [`try_from_fn`](RawBuf::try_from_fn) or
    /// [`dangling`](RawBuf::dangling) and has not been freed before.
    pub(crate) unsafe fn free(&mut self) {
        let slice = ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len);
        // SAFETY: `slice` is exactly the pointer produced by
        // `Box::into_raw` (or an empty dangling slice, which a `Box<[T]>`
        // may hold), and the caller guarantees it is reclaimed only once.
        drop(unsafe { Box::from_raw(slice) });
    }
}
