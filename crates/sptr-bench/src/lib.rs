//! Fixture builders shared by the sptr benchmarks.
//!
//! - [`sequential_buffer`]: a live buffer holding `0..len`
//! - [`square_matrix`]: an `n`×`n` matrix of independently allocated rows
//! - [`release_matrix`]: rows first, then the outer buffer
//!
//! Build with `--features unchecked` to measure the unchecked variant.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use sptr::Sptr;

/// A live buffer of `len` elements where slot `i` holds `i`.
pub fn sequential_buffer(len: usize) -> Sptr<u64> {
    Sptr::from_fn(len, |i| i as u64)
}

/// An `n`×`n` matrix where cell `(i, j)` holds `i * n + j`.
pub fn square_matrix(n: usize) -> Sptr<Sptr<u64>> {
    Sptr::from_fn(n, |i| Sptr::from_fn(n, |j| (i * n + j) as u64))
}

/// Release every row of `m`, then `m` itself.
pub fn release_matrix<T>(m: &mut Sptr<Sptr<T>>) {
    for i in 0..m.capacity() {
        m.at(i).release();
    }
    m.release();
}

/// Sum all elements through checked access.
pub fn sum_checked(buf: &mut Sptr<u64>) -> u64 {
    let mut total = 0u64;
    for i in 0..buf.capacity() {
        total = total.wrapping_add(*buf.at(i));
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_sum() {
        let mut buf = sequential_buffer(100);
        assert_eq!(sum_checked(&mut buf), 4950);
        buf.release();
    }

    #[test]
    fn square_matrix_layout() {
        let mut m = square_matrix(4);
        assert_eq!(*m.at2(3, 2), 14);
        release_matrix(&mut m);
        if sptr::CHECKED {
            assert_eq!(m.state(), sptr::BufferState::Freed);
        }
    }
}
