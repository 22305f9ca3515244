use std::hint::black_box;

use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};

use zenith::catalog::{BrightStars, CatalogSource};
use zenith::ephemeris::MeanElementsEphemeris;
use zenith::{Observer, PositionEngine};

fn engine(with_ephemeris: bool) -> PositionEngine {
    let mut engine = PositionEngine::new().with_horizon_cutoff(None);
    engine.set_catalog(&BrightStars.stars().expect("bright star table"));
    if with_ephemeris {
        engine.set_ephemeris(Some(Box::new(MeanElementsEphemeris::new())));
    }
    engine
}

fn bench_zenith_proximity(c: &mut Criterion) {
    let observer = Observer::new(37.7749, -122.4194, 16.0);
    let instant = Utc.with_ymd_and_hms(2024, 6, 21, 8, 47, 0).unwrap();

    let reduced = engine(false);
    c.bench_function("zenith_proximity/bright_stars_reduced", |b| {
        b.iter(|| reduced.calculate_zenith_proximity(black_box(&observer), black_box(&instant)))
    });

    let full = engine(true);
    c.bench_function("zenith_proximity/bright_stars_full", |b| {
        b.iter(|| full.calculate_zenith_proximity(black_box(&observer), black_box(&instant)))
    });
}

fn bench_solar_system(c: &mut Criterion) {
    let observer = Observer::new(-33.87, 151.21, 58.0);
    let instant = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
    let full = engine(true);

    c.bench_function("solar_system/all_bodies", |b| {
        b.iter(|| full.calculate_solar_system(black_box(&observer), black_box(&instant)))
    });
}

criterion_group!(benches, bench_zenith_proximity, bench_solar_system);
criterion_main!(benches);
