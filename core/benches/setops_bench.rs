use criterion::{criterion_group, criterion_main, Criterion};
use ferret_core::setops::{intersect, union};

fn bench_setops(c: &mut Criterion) {
    let a: Vec<u32> = (0..100_000).step_by(2).collect();
    let b: Vec<u32> = (0..100_000).step_by(3).collect();
    c.bench_function("intersect_100k", |bench| {
        bench.iter(|| intersect(a.clone(), b.clone()))
    });
    c.bench_function("union_100k", |bench| {
        bench.iter(|| union(a.clone(), b.clone()))
    });
}

criterion_group!(benches, bench_setops);
criterion_main!(benches);
