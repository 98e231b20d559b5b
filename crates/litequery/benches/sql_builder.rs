use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use litequery::{QueryBuilder, compile};

/// Build a builder with `n` conditions alternating AND/OR:
/// SELECT * FROM t WHERE col0 >= ? OR col1 >= ? AND col2 >= ? ...
fn build_select(n: usize) -> QueryBuilder {
    let mut qb = litequery::select("t");
    for i in 0..n {
        let field = format!("col{i}__gte");
        qb = if i % 2 == 0 {
            qb.and(&field, i as i64)
        } else {
            qb.or(&field, i as i64)
        }
        .expect("valid lookup");
    }
    qb
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/build");

    for n in [1, 5, 10, 50, 100] {
        let qb = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.build()));
        });
    }

    group.finish();
}

fn bench_chain_and_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/chain_and_build");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let qb = build_select(n);
                black_box(qb.build());
            });
        });
    }

    group.finish();
}

fn bench_compile_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/compile_in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| black_box(compile("id__in", values.clone()).expect("list")));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_chain_and_build,
    bench_compile_in_list
);
criterion_main!(benches);
