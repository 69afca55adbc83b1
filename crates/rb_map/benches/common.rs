use std::collections::BTreeMap;
use std::hint::black_box;
use std::time::Duration;

use bench::{apply_medium_runtime_config, apply_small_runtime_config, default_rng};
use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, BenchmarkId};
use rand::Rng;
use rand::seq::SliceRandom;

use rb_map::RbTreeMap;

const SIZES: [usize; 3] = [1_000, 8_000, 64_000];
const LOOKUPS_PER_ITER: usize = 200;
const LOOKUP_HIT_RATE_PERCENT: u64 = 80;

/// Minimal map surface the workloads need, so each workload runs unchanged
/// over the crate's tree and the std baseline.
pub trait BenchMap {
    fn new() -> Self;
    fn insert(&mut self, key: u64, value: u64);
    fn get(&self, key: &u64) -> Option<u64>;
    fn len(&self) -> usize;
}

impl BenchMap for RbTreeMap<u64, u64> {
    fn new() -> Self {
        RbTreeMap::new()
    }

    fn insert(&mut self, key: u64, value: u64) {
        RbTreeMap::insert(self, key, value);
    }

    fn get(&self, key: &u64) -> Option<u64> {
        RbTreeMap::get(self, key).copied()
    }

    fn len(&self) -> usize {
        RbTreeMap::len(self)
    }
}

impl BenchMap for BTreeMap<u64, u64> {
    fn new() -> Self {
        BTreeMap::new()
    }

    fn insert(&mut self, key: u64, value: u64) {
        BTreeMap::insert(self, key, value);
    }

    fn get(&self, key: &u64) -> Option<u64> {
        BTreeMap::get(self, key).copied()
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

pub fn bench_insert_ascending<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: BenchMap,
{
    for &size in &SIZES {
        apply_medium_runtime_config(group);
        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter(|| {
                let mut map = M::new();
                for k in 0..size as u64 {
                    map.insert(k, k);
                }
                black_box(map.len())
            })
        });
    }
}

pub fn bench_insert_shuffled<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: BenchMap,
{
    for &size in &SIZES {
        apply_medium_runtime_config(group);
        let mut rng = default_rng();
        let mut keys: Vec<u64> = (0..size as u64).collect();
        keys.shuffle(&mut rng);

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter(|| {
                let mut map = M::new();
                for &k in &keys {
                    map.insert(k, k);
                }
                black_box(map.len())
            })
        });
    }
}

pub fn bench_get<M, T>(group: &mut BenchmarkGroup<'_, T>, label: &str)
where
    T: Measurement<Value = Duration>,
    M: BenchMap,
{
    for &size in &SIZES {
        apply_small_runtime_config(group);
        let mut rng = default_rng();
        // Even keys only, so odd probes are guaranteed misses.
        let mut keys: Vec<u64> = (0..size as u64).map(|i| i * 2).collect();
        keys.shuffle(&mut rng);

        let mut map = M::new();
        for &k in &keys {
            map.insert(k, k);
        }

        let probes: Vec<u64> = (0..LOOKUPS_PER_ITER)
            .map(|_| {
                if rng.random_range(0..100) < LOOKUP_HIT_RATE_PERCENT {
                    keys[rng.random_range(0..keys.len())]
                } else {
                    rng.random::<u64>() | 1
                }
            })
            .collect();

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter(|| {
                for key in &probes {
                    black_box(map.get(key));
                }
            })
        });
    }
}

pub fn bench_all_insert_ascending<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_insert_ascending::<RbTreeMap<u64, u64>, _>(group, "rb");
    bench_insert_ascending::<BTreeMap<u64, u64>, _>(group, "std_btree");
}

pub fn bench_all_insert_shuffled<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_insert_shuffled::<RbTreeMap<u64, u64>, _>(group, "rb");
    bench_insert_shuffled::<BTreeMap<u64, u64>, _>(group, "std_btree");
}

pub fn bench_all_get<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_get::<RbTreeMap<u64, u64>, _>(group, "rb");
    bench_get::<BTreeMap<u64, u64>, _>(group, "std_btree");
}
