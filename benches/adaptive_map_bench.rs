use adaptive_map::{AdaptiveMap, Comparer, FnEquality};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::rc::Rc;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn identity() -> Comparer<i32> {
    Rc::new(FnEquality::new(|a: &i32, b: &i32| a == b, |k: &i32| *k as u32))
}

// Same keys through the native path and the probe-table path.
fn bench_insert(c: &mut Criterion) {
    let keys: Vec<i32> = lcg(1).take(10_000).map(|x| (x >> 33) as i32).collect();

    c.bench_function("native_insert_10k", |b| {
        b.iter_batched(
            AdaptiveMap::<i32, u64>::new,
            |mut m| {
                for (i, k) in keys.iter().enumerate() {
                    m.insert(*k, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("probe_table_insert_10k", |b| {
        b.iter_batched(
            || AdaptiveMap::<i32, u64>::with_comparer(identity()),
            |mut m| {
                for (i, k) in keys.iter().enumerate() {
                    m.insert(*k, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("probe_table_get_hit", |b| {
        let mut m: AdaptiveMap<u64, u64> = AdaptiveMap::new();
        let keys: Vec<u64> = lcg(7).take(20_000).collect();
        for (i, k) in keys.iter().enumerate() {
            m.insert(*k, i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("probe_table_get_miss", |b| {
        let mut m: AdaptiveMap<u64, u64> = AdaptiveMap::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.insert(x, i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = miss.next().unwrap();
            black_box(m.get(&k));
        })
    });
}

// Tiny maps never leave the linear scan.
fn bench_small(c: &mut Criterion) {
    c.bench_function("small_map_insert_get_2", |b| {
        b.iter(|| {
            let mut m: AdaptiveMap<u64, u64> = AdaptiveMap::new();
            m.insert(1, 1);
            m.insert(2, 2);
            black_box((m.get(&1), m.get(&2)));
        })
    });
}

// Removal rebuilds the probe table; this tracks that cost.
fn bench_remove(c: &mut Criterion) {
    c.bench_function("probe_table_remove_1k", |b| {
        b.iter_batched(
            || (0..1_000u64).map(|k| (k, k)).collect::<AdaptiveMap<u64, u64>>(),
            |mut m| {
                for k in 0..1_000u64 {
                    m.remove(&k);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_get_hit, bench_get_miss, bench_small, bench_remove
}
criterion_main!(benches);
