// Weave API benchmark suite - measures add_atom, merge, and snapshot
// performance across replica sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tapestry::replica::Replica;

fn build_replica(num_chars: usize) -> Replica {
    let mut r = Replica::new();
    for i in 0..num_chars {
        let c = char::from_u32(b'a' as u32 + (i % 26) as u32).unwrap();
        r.insert_char(c).unwrap();
    }
    return r;
}

fn bench_sequential_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_insert");
    for size in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("insert_char", size), &size, |b, &size| {
            b.iter(|| {
                let mut r = Replica::new();
                for i in 0..size {
                    let ch = char::from_u32(b'a' as u32 + (i % 26) as u32).unwrap();
                    r.insert_char(ch).unwrap();
                }
                return black_box(r.weave().len());
            });
        });
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    for size in [100, 1_000, 10_000] {
        let r = build_replica(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("snapshot", size), &r, |b, r| {
            b.iter(|| black_box(r.snapshot()));
        });
    }
    group.finish();
}

fn bench_now_and_view_at(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_travel");
    let r = build_replica(10_000);
    group.bench_function("now", |b| {
        b.iter(|| black_box(r.now()));
    });
    let weft = r.now();
    group.bench_function("view_at", |b| {
        b.iter(|| black_box(r.view_at(&weft).unwrap()));
    });
    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for remote_size in [100, 1_000] {
        let base = build_replica(10_000);
        let mut other = base.clone().fork().unwrap();
        for i in 0..remote_size {
            let ch = char::from_u32(b'A' as u32 + (i % 26) as u32).unwrap();
            other.insert_char(ch).unwrap();
        }
        group.throughput(Throughput::Elements(remote_size as u64));
        group.bench_with_input(
            BenchmarkId::new("merge_remote_atoms", remote_size),
            &(base, other),
            |b, (base, other)| {
                b.iter(|| {
                    let mut target = base.clone();
                    target.merge(other);
                    return black_box(target.weave().len());
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_insert,
    bench_snapshot,
    bench_now_and_view_at,
    bench_merge,
);
criterion_main!(benches);
