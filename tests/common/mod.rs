#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use zenith::catalog::{BrightStars, CatalogSource};
use zenith::ephemeris::MeanElementsEphemeris;
use zenith::{CelestialResult, Observer, PositionEngine, SolarBody};

pub fn san_francisco() -> Observer {
    Observer::new(37.7749, -122.4194, 16.0)
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

/// Bright-star engine without ephemeris.
pub fn bright_engine() -> PositionEngine {
    let mut engine = PositionEngine::new();
    engine.set_catalog(&BrightStars.stars().unwrap());
    engine
}

pub fn full_engine() -> PositionEngine {
    let mut engine = bright_engine();
    engine.set_ephemeris(Some(Box::new(MeanElementsEphemeris::new())));
    engine
}

pub fn find<'a>(results: &'a [CelestialResult], name: &str) -> Option<&'a CelestialResult> {
    results.iter().find(|r| r.name == name)
}

pub fn assert_result_invariants(results: &[CelestialResult]) {
    for r in results {
        assert_angles(&r.name, r.elevation, r.azimuth, r.zenith_distance);
    }
    assert!(results
        .windows(2)
        .all(|w| w[0].zenith_distance <= w[1].zenith_distance));
}

/// Angles shared by star and body results.
fn assert_angles(name: &str, elevation: f64, azimuth: f64, zenith_distance: f64) {
    assert!(
        (zenith_distance - (90.0 - elevation)).abs() < 1e-3,
        "{name}: zenith distance {zenith_distance} vs elevation {elevation}"
    );
    assert!((0.0..360.0).contains(&azimuth), "{name}: azimuth {azimuth}");
}

pub fn assert_solar_invariants(bodies: &[SolarBody]) {
    for b in bodies {
        assert_angles(&b.name, b.elevation, b.azimuth, b.zenith_distance);
        assert!(
            b.distance_au.is_finite() && b.distance_au > 0.0,
            "{}: distance {}",
            b.name,
            b.distance_au
        );
    }
    assert!(bodies
        .windows(2)
        .all(|w| w[0].zenith_distance <= w[1].zenith_distance));
}
