//! Benchmarks for numeric_core.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use numeric_core::math::{elementary, gamma, Polynom};
use numeric_core::types::{Decimal, ExactRational, MathContext};

fn benchmark_elementary(c: &mut Criterion) {
    let x: Decimal = "2.718281828".parse().unwrap();
    let mut group = c.benchmark_group("elementary");
    for precision in [34u64, 128] {
        let ctx = MathContext::working(precision);
        group.bench_with_input(BenchmarkId::new("exp", precision), &ctx, |b, ctx| {
            b.iter(|| elementary::exp(black_box(&x), ctx))
        });
        group.bench_with_input(BenchmarkId::new("ln", precision), &ctx, |b, ctx| {
            b.iter(|| elementary::ln(black_box(&x), ctx))
        });
        group.bench_with_input(BenchmarkId::new("sqrt", precision), &ctx, |b, ctx| {
            b.iter(|| elementary::sqrt(black_box(&x), ctx))
        });
    }
    group.finish();
}

fn benchmark_ln_gamma(c: &mut Criterion) {
    let alpha: Decimal = "0.000841625".parse().unwrap();
    let ctx = MathContext::working(128);

    c.bench_function("ln_gamma_128", |b| {
        b.iter(|| gamma::ln_gamma(black_box(&alpha), &ctx))
    });
}

fn benchmark_horner(c: &mut Criterion) {
    let p = Polynom::from_integers(&[7, -3, 0, 12, 5, -1, 9, 2]).unwrap();
    let x = ExactRational::new(-17, 13).unwrap();

    c.bench_function("polynom_horner", |b| b.iter(|| p.calculate(black_box(&x))));
}

criterion_group!(benches, benchmark_elementary, benchmark_ln_gamma, benchmark_horner);
criterion_main!(benches);
