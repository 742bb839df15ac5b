use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use llrb_tree::LLRBTreeMap;
use std::collections::BTreeMap;
use std::hint::black_box;

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn key_orders() -> [(&'static str, Vec<i64>); 3] {
    [
        ("ordered", ordered_keys(N)),
        ("reverse", reverse_ordered_keys(N)),
        ("random", random_keys(N)),
    ]
}

// ─── CRUD ───────────────────────────────────────────────────────────────────

fn bench_map_insert(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let mut group = c.benchmark_group(format!("map_insert_{order}"));

        group.bench_function(BenchmarkId::new("LLRBTreeMap", N), |b| {
            b.iter(|| {
                let mut map = LLRBTreeMap::new();
                for &k in &keys {
                    map.insert(k, k);
                }
                map
            });
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                let mut map = BTreeMap::new();
                for &k in &keys {
                    map.insert(k, k);
                }
                map
            });
        });

        group.finish();
    }
}

fn bench_map_get(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let llrb_map: LLRBTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

        let mut group = c.benchmark_group(format!("map_get_{order}"));

        group.bench_function(BenchmarkId::new("LLRBTreeMap", N), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for &k in &keys {
                    if let Some(&v) = llrb_map.get(&k) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for &k in &keys {
                    if let Some(&v) = bt_map.get(&k) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });

        group.finish();
    }
}

fn bench_map_remove(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let mut group = c.benchmark_group(format!("map_remove_{order}"));

        group.bench_function(BenchmarkId::new("LLRBTreeMap", N), |b| {
            b.iter_batched(
                || keys.iter().map(|&k| (k, k)).collect::<LLRBTreeMap<i64, i64>>(),
                |mut map| {
                    for &k in &keys {
                        map.remove(&k);
                    }
                    map
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter_batched(
                || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
                |mut map| {
                    for &k in &keys {
                        map.remove(&k);
                    }
                    map
                },
                BatchSize::SmallInput,
            );
        });

        group.finish();
    }
}

fn bench_map_delete_min(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("map_delete_min");

    group.bench_function(BenchmarkId::new("LLRBTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<LLRBTreeMap<i64, i64>>(),
            |mut map| {
                while let Ok(entry) = map.delete_min() {
                    black_box(entry);
                }
                map
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
            |mut map| {
                while let Some(entry) = map.pop_first() {
                    black_box(entry);
                }
                map
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Ordered queries ────────────────────────────────────────────────────────

fn bench_map_rank(c: &mut Criterion) {
    let keys = random_keys(N);
    let llrb_map: LLRBTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let probes: Vec<i64> = keys.iter().step_by(100).copied().collect();

    let mut group = c.benchmark_group("map_rank");

    group.bench_function(BenchmarkId::new("LLRBTreeMap", probes.len()), |b| {
        b.iter(|| probes.iter().map(|k| llrb_map.rank(k)).sum::<usize>());
    });

    // BTreeMap has no rank; counting the prefix is the closest equivalent.
    group.bench_function(BenchmarkId::new("BTreeMap", probes.len()), |b| {
        b.iter(|| probes.iter().map(|k| bt_map.range(..*k).count()).sum::<usize>());
    });

    group.finish();
}

fn bench_map_select(c: &mut Criterion) {
    let keys = random_keys(N);
    let llrb_map: LLRBTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let ranks: Vec<usize> = (0..llrb_map.len()).step_by(100).collect();

    let mut group = c.benchmark_group("map_select");

    group.bench_function(BenchmarkId::new("LLRBTreeMap", ranks.len()), |b| {
        b.iter(|| {
            ranks
                .iter()
                .filter_map(|&i| llrb_map.select(i).ok())
                .fold(0i64, |sum, &k| sum.wrapping_add(k))
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", ranks.len()), |b| {
        b.iter(|| {
            ranks
                .iter()
                .filter_map(|&i| bt_map.keys().nth(i))
                .fold(0i64, |sum, &k| sum.wrapping_add(k))
        });
    });

    group.finish();
}

fn bench_map_floor(c: &mut Criterion) {
    let keys = random_keys(N);
    let llrb_map: LLRBTreeMap<i64, i64> = keys.iter().step_by(2).map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().step_by(2).map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_floor");

    group.bench_function(BenchmarkId::new("LLRBTreeMap", N), |b| {
        b.iter(|| keys.iter().filter_map(|k| llrb_map.floor(k)).count());
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| keys.iter().filter_map(|k| bt_map.range(..=*k).next_back()).count());
    });

    group.finish();
}

fn bench_map_iter(c: &mut Criterion) {
    let keys = random_keys(N);
    let llrb_map: LLRBTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_iter");

    group.bench_function(BenchmarkId::new("LLRBTreeMap", N), |b| {
        b.iter(|| llrb_map.values().fold(0i64, |sum, &v| sum.wrapping_add(v)));
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| bt_map.values().fold(0i64, |sum, &v| sum.wrapping_add(v)));
    });

    group.finish();
}

criterion_group!(crud_benches, bench_map_insert, bench_map_get, bench_map_remove, bench_map_delete_min,);

criterion_group!(query_benches, bench_map_rank, bench_map_select, bench_map_floor, bench_map_iter,);

criterion_main!(crud_benches, query_benches);
