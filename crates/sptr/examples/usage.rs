//! Allocate, access, and release a buffer and a small matrix.
//!
//! Pass `oob`, `uaf`, or `double-free` as the first argument to watch the
//! corresponding fatal diagnostic end the process.

use sptr::Sptr;

fn main() {
    let mut arr = Sptr::<i32>::new(10);
    for i in 0..arr.capacity() {
        *arr.at(i) = (i * i) as i32;
    }
    println!("arr[5] = {}", arr.at(5));

    let mut grid = Sptr::<Sptr<f64>>::new_matrix(3, 4);
    for i in 0..3 {
        for j in 0..4 {
            *grid.at2(i, j) = i as f64 + j as f64 / 10.0;
        }
    }
    println!("grid[2][3] = {}", grid.at2(2, 3));

    match std::env::args().nth(1).as_deref() {
        Some("oob") => {
            let _ = *arr.at(10);
        }
        Some("uaf") => {
            arr.release();
            let _ = *arr.at(0);
        }
        Some("double-free") => {
            arr.release();
            arr.release();
        }
        _ => arr.release(),
    }

    // Rows first: releasing the outer buffer does not release them.
    for i in 0..grid.capacity() {
        grid.at(i).release();
    }
    grid.release();
}
