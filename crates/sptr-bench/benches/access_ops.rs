//! Criterion micro-benchmarks for element access, matrix access, and the
//! allocate/release cycle, with `Vec` indexing as the baseline.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use sptr::{OwnedSptr, Sptr};
use sptr_bench::{release_matrix, sequential_buffer, square_matrix, sum_checked};

const LEN: usize = 10_000;
const SIDE: usize = 100;

/// Benchmark: Sum 10K elements through `Sptr::at`.
fn bench_sptr_sum_10k(c: &mut Criterion) {
    let mut buf = sequential_buffer(LEN);
    c.bench_function("sptr_sum_10k", |b| {
        b.iter(|| black_box(sum_checked(black_box(&mut buf))));
    });
    buf.release();
}

/// Benchmark: Sum 10K elements through `OwnedSptr::at`.
fn bench_owned_sum_10k(c: &mut Criterion) {
    let mut buf = OwnedSptr::from_fn(LEN, |i| i as u64);
    c.bench_function("owned_sum_10k", |b| {
        b.iter(|| {
            let mut total = 0u64;
            for i in 0..LEN {
                total = total.wrapping_add(*buf.at(i));
            }
            black_box(total)
        });
    });
}

/// Benchmark: Sum 10K elements of a `Vec` by index (baseline).
fn bench_vec_sum_10k(c: &mut Criterion) {
    let data: Vec<u64> = (0..LEN as u64).collect();
    c.bench_function("vec_sum_10k", |b| {
        b.iter(|| {
            let data = black_box(&data);
            let mut total = 0u64;
            for i in 0..LEN {
                total = total.wrapping_add(data[i]);
            }
            black_box(total)
        });
    });
}

/// Benchmark: Write every cell of a 100x100 matrix through `at2`.
fn bench_matrix_write_100x100(c: &mut Criterion) {
    let mut m = square_matrix(SIDE);
    c.bench_function("matrix_write_100x100", |b| {
        b.iter(|| {
            for i in 0..SIDE {
                for j in 0..SIDE {
                    *m.at2(i, j) = black_box((i ^ j) as u64);
                }
            }
        });
    });
    release_matrix(&mut m);
}

/// Benchmark: Allocate and release a 1K-element buffer.
fn bench_alloc_release_1k(c: &mut Criterion) {
    c.bench_function("alloc_release_1k", |b| {
        b.iter(|| {
            let mut buf = Sptr::<u64>::new(black_box(1_000));
            black_box(buf.capacity());
            buf.release();
        });
    });
}

criterion_group!(
    benches,
    bench_sptr_sum_10k,
    bench_owned_sum_10k,
    bench_vec_sum_10k,
    bench_matrix_write_100x100,
    bench_alloc_release_1k
);
criterion_main!(benches);
