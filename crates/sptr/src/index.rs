//! Index types accepted by element access.

/// An integer usable as an element index.
///
/// Indices are signed in the checked contract: a negative index is a
/// detectable out-of-range access rather than a huge unsigned offset.
/// Implemented for every primitive integer up to 64 bits.
pub trait ElementIndex: Copy {
    /// The index widened without loss.
    fn signed(self) -> i128;

    /// The index reinterpreted as an offset, wrapping negatives.
    ///
    /// Used only by the unchecked build.
    fn wrapping_offset(self) -> usize;
}

macro_rules! impl_element_index {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ElementIndex for $ty {
                #[inline(always)]
                fn signed(self) -> i128 {
                    self as i128
                }

                #[inline(always)]
                fn wrapping_offset(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_element_index!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Resolve `index` against `capacity`, or `None` if it is out of range.
#[cfg(any(test, not(feature = "unchecked")))]
#[inline]
pub(crate) fn checked_offset<I: ElementIndex>(index: I, capacity: usize) -> Option<usize> {
    let signed = index.signed();
    if signed < 0 || signed >= capacity as i128 {
        None
    } else {
        Some(signed as usize)
    }
}
