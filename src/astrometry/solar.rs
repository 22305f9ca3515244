//! Low-precision Sun (Astronomical Almanac, about 0.01° between 1950 and 2050).
use nalgebra::Vector3;

use crate::constants::{DAYS_PER_CENTURY, RADEG};
use crate::ref_system::{prec, rotmt, Axis};

/// Apparent geocentric Sun, equatorial J2000, in AU.
///
/// The almanac longitude already contains the annual aberration, so the result must not be
/// corrected for light-time again.
pub fn sun_position(centuries: f64) -> Vector3<f64> {
    let n = centuries * DAYS_PER_CENTURY;

    let mean_longitude = (280.460 + 0.9856474 * n).rem_euclid(360.0);
    let mean_anomaly = (357.528 + 0.9856003 * n).rem_euclid(360.0) * RADEG;

    let longitude =
        (mean_longitude + 1.915 * mean_anomaly.sin() + 0.020 * (2.0 * mean_anomaly).sin()) * RADEG;
    let distance =
        1.00014 - 0.01671 * mean_anomaly.cos() - 0.00014 * (2.0 * mean_anomaly).cos();
    let obliquity = (23.439 - 0.0000004 * n) * RADEG;

    let ecliptic_of_date = Vector3::new(longitude.cos(), longitude.sin(), 0.0) * distance;
    let equatorial_of_date = rotmt(obliquity, Axis::X) * ecliptic_of_date;

    prec(centuries).transpose() * equatorial_of_date
}
