//! The checked buffer handle.
//!
//! [`Sptr<T>`] owns a fixed-capacity heap allocation and validates every
//! element access and the final release. The lifecycle is manual:
//!
//! ```text
//! new / from_fn / filled ──► Live ──release──► Freed
//!                             │                  │
//!                          at(i) ok        at(i)   → use after free
//!                                          release → double free
//! ```
//!
//! A handle built with [`Sptr::null`] has no validity tracking at all; it
//! behaves as if already released.
//!
//! With the `unchecked` feature the state field is compiled out and
//! [`at`](Sptr::at) / [`release`](Sptr::release) touch memory directly.
//! Misuse is then undefined behaviour.
//!
//! There is no `Drop` impl. A handle that is never released leaks its
//! storage, and dropping an `Sptr<Sptr<T>>` or releasing it never releases
//! the inner rows.

use std::fmt;
use std::mem;
use std::panic::Location;

use crate::error::{Site, SptrError};
use crate::fatal::or_fail;
#[cfg(not(feature = "unchecked"))]
use crate::index::checked_offset;
use crate::index::ElementIndex;
use crate::raw::RawBuf;

/// Validity of a buffer handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferState {
    /// Storage is allocated; in-range access is allowed.
    Live,
    /// Storage has been released.
    Freed,
    /// No validity tracking: a null handle, or any handle in the unchecked build.
    Untracked,
}

/// An owning, fixed-capacity buffer with checked access and explicit release.
///
/// The handle is neither `Send` nor `Sync`: the validity check and the
/// state change in [`release`](Sptr::release) are not atomic, so sharing a
/// handle across threads could defeat double-free detection.
///
/// ```compile_fail
/// fn assert_send<T: Send>() {}
/// assert_send::<sptr::Sptr<i32>>();
/// ```
///
/// # Example
///
/// ```
/// use sptr::Sptr;
///
/// let mut arr = Sptr::<i32>::new(10);
/// *arr.at(5) = 42;
/// assert_eq!(*arr.at(5), 42);
/// arr.release();
/// ```
#[must_use = "an Sptr leaks its storage unless released"]
pub struct Sptr<T> {
    raw: RawBuf<T>,
    #[cfg(not(feature = "unchecked"))]
    state: BufferState,
}

impl<T> Sptr<T> {
    /// Allocate `count` default-initialised elements.
    ///
    /// Terminates the process if the allocation cannot be satisfied.
    #[track_caller]
    pub fn new(count: usize) -> Self
    where
        T: Default,
    {
        or_fail(Self::alloc(count, |_| T::default(), Location::caller()))
    }

    /// Fallible form of [`new`](Sptr::new).
    #[track_caller]
    pub fn try_new(count: usize) -> Result<Self, SptrError>
    where
        T: Default,
    {
        Self::alloc(count, |_| T::default(), Location::caller())
    }

    /// Allocate `count` copies of `value`.
    #[track_caller]
    pub fn filled(count: usize, value: T) -> Self
    where
        T: Clone,
    {
        or_fail(Self::alloc(count, |_| value.clone(), Location::caller()))
    }

    /// Fallible form of [`filled`](Sptr::filled).
    #[track_caller]
    pub fn try_filled(count: usize, value: T) -> Result<Self, SptrError>
    where
        T: Clone,
    {
        Self::alloc(count, |_| value.clone(), Location::caller())
    }

    /// Allocate `count` elements, initialising slot `i` with `init(i)`.
    #[track_caller]
    pub fn from_fn(count: usize, init: impl FnMut(usize) -> T) -> Self {
        or_fail(Self::alloc(count, init, Location::caller()))
    }

    /// Fallible form of [`from_fn`](Sptr::from_fn).
    #[track_caller]
    pub fn try_from_fn(count: usize, init: impl FnMut(usize) -> T) -> Result<Self, SptrError> {
        Self::alloc(count, init, Location::caller())
    }

    pub(crate) fn alloc(
        count: usize,
        init: impl FnMut(usize) -> T,
        site: Site,
    ) -> Result<Self, SptrError> {
        RawBuf::try_from_fn(count, init)
            .map(Self::from_raw)
            .map_err(|_| SptrError::AllocationFailed {
                bytes: mem::size_of::<T>().checked_mul(count),
                site,
            })
    }

    pub(crate) fn from_raw(raw: RawBuf<T>) -> Self {
        Self {
            raw,
            #[cfg(not(feature = "unchecked"))]
            state: BufferState::Live,
        }
    }

    /// A handle with capacity 0 and no validity tracking.
    ///
    /// Every access is out of range and every release is a double free.
    pub const fn null() -> Self {
        Self {
            raw: RawBuf::dangling(),
            #[cfg(not(feature = "unchecked"))]
            state: BufferState::Untracked,
        }
    }

    /// Number of elements, fixed at construction. Unchanged by release.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the capacity is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Current validity of the handle.
    ///
    /// Always [`BufferState::Untracked`] in the unchecked build.
    pub fn state(&self) -> BufferState {
        #[cfg(not(feature = "unchecked"))]
        {
            self.state
        }
        #[cfg(feature = "unchecked")]
        {
            BufferState::Untracked
        }
    }

    /// Mutable reference to the element at `index`.
    ///
    /// In the checked build, terminates the process if `index` is negative
    /// or not below [`capacity`](Sptr::capacity) (checked first), or if the
    /// buffer is not live. In the unchecked build either misuse is
    /// undefined behaviour.
    #[track_caller]
    #[inline]
    pub fn at<I: ElementIndex>(&mut self, index: I) -> &mut T {
        or_fail(self.try_at(index))
    }

    /// Fallible form of [`at`](Sptr::at). Never fails in the unchecked build.
    #[cfg(not(feature = "unchecked"))]
    #[track_caller]
    #[inline]
    #[allow(unsafe_code)]
    pub fn try_at<I: ElementIndex>(&mut self, index: I) -> Result<&mut T, SptrError> {
        let Some(offset) = checked_offset(index, self.raw.len()) else {
            return Err(SptrError::OutOfRange {
                index: index.signed(),
                capacity: self.raw.len(),
                site: Location::caller(),
            });
        };
        if self.state != BufferState::Live {
            return Err(SptrError::UseAfterFree {
                site: Location::caller(),
            });
        }
        // SAFETY: offset < len and the storage is live.
        Ok(unsafe { self.raw.slot(offset) })
    }

    /// Fallible form of [`at`](Sptr::at). Never fails in the unchecked build.
    ///
    /// In this build nothing is validated: a negative or out-of-range
    /// index, or access after release, is undefined behaviour.
    #[cfg(feature = "unchecked")]
    #[track_caller]
    #[inline(always)]
    #[allow(unsafe_code)]
    pub fn try_at<I: ElementIndex>(&mut self, index: I) -> Result<&mut T, SptrError> {
        // SAFETY: none. The unchecked build hands validity to the caller.
        Ok(unsafe { self.raw.slot(index.wrapping_offset()) })
    }

    /// Drop the elements and free the storage.
    ///
    /// In the checked build, terminates the process if the buffer was
    /// already released or is untracked. Not idempotent. In the unchecked
    /// build a second release is undefined behaviour.
    #[track_caller]
    pub fn release(&mut self) {
        or_fail(self.try_release())
    }

    /// Fallible form of [`release`](Sptr::release). Never fails in the
    /// unchecked build.
    #[cfg(not(feature = "unchecked"))]
    #[track_caller]
    #[allow(unsafe_code)]
    pub fn try_release(&mut self) -> Result<(), SptrError> {
        if self.state != BufferState::Live {
            return Err(SptrError::DoubleFree {
                site: Location::caller(),
            });
        }
        self.state = BufferState::Freed;
        // SAFETY: the state was Live, so the storage has not been freed.
        unsafe { self.raw.free() };
        Ok(())
    }

    /// Fallible form of [`release`](Sptr::release). Never fails in the
    /// unchecked build.
    ///
    /// In this build nothing is validated: releasing the same storage
    /// twice, or accessing it afterwards, is undefined behaviour.
    #[cfg(feature = "unchecked")]
    #[track_caller]
    #[allow(unsafe_code)]
    pub fn try_release(&mut self) -> Result<(), SptrError> {
        // SAFETY: none. The unchecked build hands validity to the caller.
        unsafe { self.raw.free() };
        Ok(())
    }
}

impl<T> Default for Sptr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> fmt::Debug for Sptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sptr")
            .field("capacity", &self.capacity())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(all(test, not(feature = "unchecked")))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fatal::catch_fatal;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn write_then_read_every_index() {
        let mut buf = Sptr::<i64>::new(8);
        for i in 0..8 {
            *buf.at(i) = i as i64 * 3;
        }
        for i in 0..8 {
            assert_eq!(*buf.at(i), i as i64 * 3);
        }
        buf.release();
    }

    #[test]
    fn new_default_initialises() {
        let mut buf = Sptr::<u32>::new(3);
        assert_eq!(*buf.at(2), 0);
        buf.release();
    }

    #[test]
    fn filled_and_from_fn() {
        let mut a = Sptr::filled(4, String::from("x"));
        assert_eq!(*a.at(3), "x");
        let mut b = Sptr::from_fn(4, |i| i * i);
        assert_eq!(*b.at(3), 9);
        a.release();
        b.release();
    }

    #[test]
    fn index_equal_to_capacity_is_out_of_range() {
        let mut buf = Sptr::<u8>::new(4);
        let err = catch_fatal(|| *buf.at(4)).unwrap_err();
        assert_eq!(
            err,
            SptrError::OutOfRange {
                index: 4,
                capacity: 4,
                site: err.site(),
            }
        );
        buf.release();
    }

    #[test]
    fn negative_index_is_out_of_range() {
        let mut buf = Sptr::<u8>::new(4);
        let err = buf.try_at(-1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        if let SptrError::OutOfRange { index, .. } = err {
            assert_eq!(index, -1);
        }
        buf.release();
    }

    #[test]
    fn rejected_access_leaves_elements_untouched() {
        let mut buf = Sptr::filled(3, 7u8);
        assert!(catch_fatal(|| *buf.at(3) = 0).is_err());
        for i in 0..3 {
            assert_eq!(*buf.at(i), 7);
        }
        buf.release();
    }

    #[test]
    fn access_after_release_is_use_after_free() {
        let mut buf = Sptr::<u8>::new(4);
        buf.release();
        assert_eq!(buf.state(), BufferState::Freed);
        let err = catch_fatal(|| *buf.at(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UseAfterFree);
    }

    #[test]
    fn range_is_checked_before_lifetime() {
        let mut buf = Sptr::<u8>::new(4);
        buf.release();
        assert_eq!(buf.try_at(4).unwrap_err().kind(), ErrorKind::OutOfRange);
        assert_eq!(buf.try_at(3).unwrap_err().kind(), ErrorKind::UseAfterFree);
    }

    #[test]
    fn second_release_is_double_free() {
        let mut buf = Sptr::<u8>::new(4);
        buf.release();
        let err = catch_fatal(|| buf.release()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DoubleFree);
        assert_eq!(buf.state(), BufferState::Freed);
    }

    #[test]
    fn capacity_survives_release() {
        let mut buf = Sptr::<u8>::new(6);
        buf.release();
        assert_eq!(buf.capacity(), 6);
    }

    #[test]
    fn null_handle_is_untracked() {
        let mut buf = Sptr::<u8>::null();
        assert_eq!(buf.state(), BufferState::Untracked);
        assert!(buf.is_empty());
        assert_eq!(buf.try_at(0).unwrap_err().kind(), ErrorKind::OutOfRange);
        assert_eq!(buf.try_release().unwrap_err().kind(), ErrorKind::DoubleFree);
    }

    #[test]
    fn default_is_null() {
        let buf: Sptr<u8> = Sptr::default();
        assert_eq!(buf.state(), BufferState::Untracked);
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn zero_capacity_buffer_releases_once() {
        let mut buf = Sptr::<u8>::new(0);
        assert_eq!(buf.state(), BufferState::Live);
        assert_eq!(buf.try_at(0).unwrap_err().kind(), ErrorKind::OutOfRange);
        buf.release();
        assert_eq!(buf.try_release().unwrap_err().kind(), ErrorKind::DoubleFree);
    }

    #[test]
    fn size_overflow_is_allocation_failure() {
        let err = Sptr::<u64>::try_new(usize::MAX).unwrap_err();
        assert_eq!(
            err,
            SptrError::AllocationFailed {
                bytes: None,
                site: err.site(),
            }
        );
        let err = catch_fatal(|| Sptr::<u64>::new(usize::MAX)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AllocationFailed);
    }

    #[test]
    fn allocator_refusal_is_allocation_failure() {
        let count = isize::MAX as usize;
        let err = Sptr::<u8>::try_new(count).unwrap_err();
        assert_eq!(
            err,
            SptrError::AllocationFailed {
                bytes: Some(count),
                site: err.site(),
            }
        );
        let err = catch_fatal(|| Sptr::<u8>::new(count)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AllocationFailed);
    }

    #[test]
    fn diagnostics_point_at_the_caller() {
        let mut buf = Sptr::<u8>::new(1);
        let line = line!() + 1;
        let err = catch_fatal(|| *buf.at(1)).unwrap_err();
        assert!(err.site().file().ends_with("buffer.rs"));
        assert_eq!(err.site().line(), line);
        buf.release();
    }

    #[test]
    fn release_drops_elements() {
        let rc = Rc::new(Cell::new(0u8));
        let mut buf = Sptr::filled(3, Rc::clone(&rc));
        assert_eq!(Rc::strong_count(&rc), 4);
        buf.release();
        assert_eq!(Rc::strong_count(&rc), 1);
    }

    #[test]
    fn debug_shows_capacity_and_state() {
        let mut buf = Sptr::<u8>::new(2);
        assert_eq!(format!("{buf:?}"), "Sptr { capacity: 2, state: Live }");
        buf.release();
        assert_eq!(format!("{buf:?}"), "Sptr { capacity: 2, state: Freed }");
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn written_values_read_back(
                values in proptest::collection::vec(any::<i32>(), 1..64),
            ) {
                let mut buf = Sptr::<i32>::new(values.len());
                for (i, &v) in values.iter().enumerate() {
                    *buf.at(i) = v;
                }
                for (i, &v) in values.iter().enumerate() {
                    prop_assert_eq!(*buf.at(i), v);
                }
                buf.release();
            }

            #[test]
            fn indices_at_or_past_capacity_rejected(
                len in 0usize..32,
                excess in 0usize..1_000,
            ) {
                let mut buf = Sptr::<u16>::new(len);
                let err = buf.try_at(len + excess).unwrap_err();
                prop_assert_eq!(err.kind(), ErrorKind::OutOfRange);
                buf.release();
            }

            #[test]
            fn negative_indices_rejected(len in 0usize..32, index in i64::MIN..0) {
                let mut buf = Sptr::<u16>::new(len);
                prop_assert_eq!(buf.try_at(index).unwrap_err().kind(), ErrorKind::OutOfRange);
                buf.release();
            }
        }
    }
}
