//! Criterion benchmarks for furrow-core wide arithmetic.
//!
//! Covers the three operations on the farming hot path: normalized division,
//! sigma subtraction and the settlement multiply.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use furrow_core::wide::WideUint;

fn bench_div_small(c: &mut Criterion) {
    // (emission_per_block * dh) << 96, divided by a realistic pool weight.
    let emission = WideUint::<5>::with_u64_at(761_035_007 * 10, 3).unwrap();
    let weight_total = WideUint::<2>::from_u64(12_345_678);

    c.bench_function("wide_div_rem_u64", |b| {
        b.iter(|| black_box(&emission).div_rem(black_box(&weight_total)))
    });
}

fn bench_div_wide(c: &mut Criterion) {
    let dividend = WideUint::<5>::from_words([u32::MAX; 5]);
    let divisor = WideUint::<5>::from_words([7, 0, 1, 0, 0]);

    c.bench_function("wide_div_rem_shift", |b| {
        b.iter(|| black_box(&dividend).div_rem(black_box(&divisor)))
    });
}

fn bench_settlement_mul(c: &mut Criterion) {
    let d_sigma = WideUint::<5>::from_words([0x1234_5678, 0x9abc_def0, 0x0fed_cba9, 42, 0]);
    let weight = WideUint::<1>::from_u32(1_000_000);

    c.bench_function("wide_widening_mul_5x1", |b| {
        b.iter(|| black_box(&d_sigma).widening_mul::<1, 6>(black_box(&weight)))
    });
}

fn bench_add_sub(c: &mut Criterion) {
    let a = WideUint::<5>::from_words([u32::MAX, 1, 2, 3, 4]);
    let b = WideUint::<5>::from_words([1, 2, 3, 4, 0]);

    c.bench_function("wide_checked_add", |bench| {
        bench.iter(|| black_box(&a).checked_add(black_box(&b)))
    });
    c.bench_function("wide_checked_sub", |bench| {
        bench.iter(|| black_box(&a).checked_sub(black_box(&b)))
    });
}

criterion_group!(
    benches,
    bench_div_small,
    bench_div_wide,
    bench_settlement_mul,
    bench_add_sub
);
criterion_main!(benches);
