//! Criterion benchmarks for tempora-match: axis preparation plus
//! nearest-neighbor search at several candidate densities.

use chrono::{DateTime, TimeDelta, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use tempora_match::{CollocationConfig, TimeIndex, TimeTable, Window, temporal_collocation};

fn base() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("1970-01-01T00:00:00Z")
        .unwrap()
        .to_utc()
}

fn daily_reference(n: usize) -> TimeIndex {
    TimeIndex::from_utc((0..n).map(|i| base() + TimeDelta::days(i as i64)).collect()).unwrap()
}

/// Candidates jittered around the daily grid, `per_day` observations per day.
fn jittered_table(n_days: usize, per_day: usize, seed: u64) -> TimeTable {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let stamps: Vec<_> = (0..n_days * per_day)
        .map(|i| {
            base()
                + TimeDelta::days((i / per_day) as i64)
                + TimeDelta::minutes(rng.gen_range(-360..=360))
        })
        .collect();
    let values = (0..stamps.len()).map(|i| i as f64).collect();
    TimeTable::series("data", TimeIndex::from_utc(stamps).unwrap(), values).unwrap()
}

fn bench_collocate(c: &mut Criterion) {
    let window = Window::from_duration(TimeDelta::hours(6)).unwrap();
    let mut group = c.benchmark_group("collocate_daily");

    for &(n_days, per_day) in &[(3_650usize, 1usize), (3_650, 4), (18_250, 1)] {
        let reference = daily_reference(n_days);
        let candidates = jittered_table(n_days, per_day, 42);
        let id = BenchmarkId::new(format!("days{n_days}"), format!("x{per_day}"));
        group.bench_with_input(id, &(reference, candidates), |b, (reference, candidates)| {
            b.iter(|| temporal_collocation(reference, candidates, window));
        });
    }

    group.finish();
}

fn bench_collocate_with_extras(c: &mut Criterion) {
    let window = Window::from_duration(TimeDelta::hours(6)).unwrap();
    let reference = daily_reference(3_650);
    let candidates = jittered_table(3_650, 4, 42);
    let config = CollocationConfig::new(window)
        .with_dropduplicates(true)
        .with_return_index(true)
        .with_return_distance(true);

    c.bench_function("collocate_3650x4_full_options", |b| {
        b.iter(|| config.collocate(&reference, &candidates));
    });
}

criterion_group!(benches, bench_collocate, bench_collocate_with_extras);
criterion_main!(benches);
