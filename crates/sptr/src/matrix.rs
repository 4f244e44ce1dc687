//! Two-level access for buffers of buffers.
//!
//! A matrix is not a separate type: it is an `Sptr<Sptr<T>>` whose outer
//! buffer owns the row handles. [`at2`](Sptr::at2) runs the ordinary
//! single-level access twice, so both levels are validated independently.
//!
//! Ownership does not cascade. Releasing the outer buffer frees the array
//! of row handles but never the rows' own storage; every row must be
//! released by the caller, in any order relative to the outer buffer.
//!
//! ```
//! use sptr::Sptr;
//!
//! let mut m = Sptr::<Sptr<f32>>::new_matrix(3, 4);
//! *m.at2(1, 2) = 0.5;
//! assert_eq!(*m.at(1).at(2), 0.5);
//!
//! for i in 0..m.capacity() {
//!     m.at(i).release();
//! }
//! m.release();
//! ```

use std::panic::Location;

use crate::buffer::Sptr;
use crate::error::SptrError;
use crate::fatal::or_fail;
use crate::index::ElementIndex;

impl<T> Sptr<Sptr<T>> {
    /// Allocate `rows` independently allocated rows of `cols` default elements.
    ///
    /// An allocation failure in any row is reported at the caller's site.
    #[track_caller]
    pub fn new_matrix(rows: usize, cols: usize) -> Self
    where
        T: Default,
    {
        or_fail(Self::try_new_matrix(rows, cols))
    }

    /// Fallible form of [`new_matrix`](Sptr::new_matrix).
    ///
    /// On failure, rows that were already allocated are released.
    #[track_caller]
    pub fn try_new_matrix(rows: usize, cols: usize) -> Result<Self, SptrError>
    where
        T: Default,
    {
        let site = Location::caller();
        let mut outer = Sptr::alloc(rows, |_| Sptr::null(), site)?;
        for i in 0..rows {
            match Sptr::alloc(cols, |_| T::default(), site) {
                Ok(row) => *outer.try_at(i)? = row,
                Err(err) => {
                    for j in 0..i {
                        outer.try_at(j)?.try_release()?;
                    }
                    outer.try_release()?;
                    return Err(err);
                }
            }
        }
        Ok(outer)
    }

    /// Mutable reference to column `j` of row `i`.
    ///
    /// Equivalent to `self.at(i).at(j)`, including which check fires first.
    #[track_caller]
    #[inline]
    pub fn at2<I: ElementIndex, J: ElementIndex>(&mut self, i: I, j: J) -> &mut T {
        self.at(i).at(j)
    }

    /// Fallible form of [`at2`](Sptr::at2).
    #[track_caller]
    #[inline]
    pub fn try_at2<I: ElementIndex, J: ElementIndex>(
        &mut self,
        i: I,
        j: J,
    ) -> Result<&mut T, SptrError> {
        self.try_at(i)?.try_at(j)
    }
}
