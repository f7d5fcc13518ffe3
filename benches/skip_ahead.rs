// Criterion benchmarks for sequence skip-ahead and row generation
//
// Skip-ahead cost decides how quickly a late partition can start, so it is
// measured against the equivalent sequential walk.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tpch_dgen::tables::{LineItemGenerator, OrderGenerator};
use tpch_dgen::{GenerationContext, Partition, RowGenerator, RowRandom, RowRandomInt, RowRandomLong};

fn bench_advance_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance_rows");
    for rows in [1_000u64, 1_000_000, 1_000_000_000] {
        group.bench_with_input(BenchmarkId::new("int", rows), &rows, |b, &rows| {
            b.iter(|| {
                let mut random = RowRandomInt::new(1_066_728_069, 7);
                random.advance_rows(black_box(rows));
                random.seed()
            })
        });
        group.bench_with_input(BenchmarkId::new("long", rows), &rows, |b, &rows| {
            b.iter(|| {
                let mut random = RowRandomLong::new(1_808_217_256, 7);
                random.advance_rows(black_box(rows));
                random.seed()
            })
        });
    }
    group.finish();
}

fn bench_sequential_rows(c: &mut Criterion) {
    c.bench_function("sequential_int_10k_rows", |b| {
        b.iter(|| {
            let mut random = RowRandomInt::new(1_066_728_069, 1);
            for _ in 0..10_000 {
                black_box(random.next_int(0, 1_000).ok());
                random.finish_row();
            }
            random.seed()
        })
    });
}

fn bench_partition_start(c: &mut Criterion) {
    let ctx = match GenerationContext::bundled(4 * 1024 * 1024) {
        Ok(ctx) => ctx,
        Err(e) => panic!("bundled distributions failed to load: {}", e),
    };
    let mut group = c.benchmark_group("partition_start");
    for index in [1u32, 50, 100] {
        let partition = Partition::new(10.0, index, 100).unwrap();
        group.bench_with_input(BenchmarkId::new("orders", index), &partition, |b, p| {
            b.iter(|| OrderGenerator::new(&ctx, *p).unwrap().capacity())
        });
    }
    group.finish();

    let partition = Partition::single(0.01).unwrap();
    c.bench_function("lineitem_rows_sf0.01", |b| {
        b.iter(|| {
            let mut generator = LineItemGenerator::new(&ctx, partition).unwrap();
            let mut rows = 0u64;
            while let Some(row) = generator.next_row().unwrap() {
                black_box(&row);
                rows += 1;
            }
            rows
        })
    });
}

criterion_group!(
    benches,
    bench_advance_rows,
    bench_sequential_rows,
    bench_partition_start
);
criterion_main!(benches);
