use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sortmerge_core::join::JoinComparison;
use sortmerge_operators::{KeyColumn, MergeDriver};

/// Ascending keys with runs of `dup` equal values.
fn keys(len: usize, dup: usize) -> Vec<i64> {
    (0..len).map(|i| (i / dup.max(1)) as i64).collect()
}

fn bench_equality(c: &mut Criterion) {
    let left = KeyColumn::new(keys(100_000, 4));
    let right = KeyColumn::new(keys(100_000, 2));
    let mut group = c.benchmark_group("merge_equality");
    for vector_size in [64usize, 1024, 8192] {
        group.bench_with_input(
            BenchmarkId::from_parameter(vector_size),
            &vector_size,
            |b, &vs| {
                b.iter(|| {
                    let mut d =
                        MergeDriver::for_columns(&left, &right, JoinComparison::Equal, vs).unwrap();
                    d.drain(|_| {}).unwrap().matches
                })
            },
        );
    }
    group.finish();
}

fn bench_range(c: &mut Criterion) {
    let left = KeyColumn::new(keys(2_000, 1));
    let right = KeyColumn::new(keys(2_000, 1));
    for op in [JoinComparison::LessThan, JoinComparison::GreaterThanOrEqual] {
        c.bench_function(&format!("merge_range_{}", op), |b| {
            b.iter(|| {
                let mut d = MergeDriver::for_columns(&left, &right, op, 1024).unwrap();
                d.drain(|_| {}).unwrap().matches
            })
        });
    }
}

criterion_group!(joins, bench_equality, bench_range);
criterion_main!(joins);
