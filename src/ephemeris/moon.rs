//! Truncated lunar theory (ELP-2000/82 main terms as tabulated by Meeus, ch. 47).
//!
//! Accuracy is a few arcminutes in longitude and latitude and a few hundred km in distance,
//! which is far below what the horizontal transform can resolve for a naked-eye display.
use nalgebra::Vector3;

use crate::constants::{RADEG, AU};
use crate::ref_system::{obleq, prec, rotmt, Axis};

/// One periodic term: multipliers of (D, M, M′, F) and the amplitude.
struct LunarTerm {
    args: [f64; 4],
    amplitude: f64,
}

const fn lt(d: f64, m: f64, mp: f64, f: f64, amplitude: f64) -> LunarTerm {
    LunarTerm {
        args: [d, m, mp, f],
        amplitude,
    }
}

/// Longitude terms, 1e-6 degree.
const LONGITUDE_TERMS: [LunarTerm; 14] = [
    lt(0., 0., 1., 0., 6288774.0),
    lt(2., 0., -1., 0., 1274027.0),
    lt(2., 0., 0., 0., 658314.0),
    lt(0., 0., 2., 0., 213618.0),
    lt(0., 1., 0., 0., -185116.0),
    lt(0., 0., 0., 2., -114332.0),
    lt(2., 0., -2., 0., 58793.0),
    lt(2., -1., -1., 0., 57066.0),
    lt(2., 0., 1., 0., 53322.0),
    lt(2., -1., 0., 0., 45758.0),
    lt(0., 1., -1., 0., -40923.0),
    lt(1., 0., 0., 0., -34720.0),
    lt(0., 1., 1., 0., -30383.0),
    lt(2., 0., 0., -2., 15327.0),
];

/// Distance terms, metres.
const DISTANCE_TERMS: [LunarTerm; 12] = [
    lt(0., 0., 1., 0., -20905355.0),
    lt(2., 0., -1., 0., -3699111.0),
    lt(2., 0., 0., 0., -2955968.0),
    lt(0., 0., 2., 0., -569925.0),
    lt(0., 1., 0., 0., 48888.0),
    lt(0., 0., 0., 2., -3149.0),
    lt(2., 0., -2., 0., 246158.0),
    lt(2., -1., -1., 0., -152138.0),
    lt(2., 0., 1., 0., -170733.0),
    lt(2., -1., 0., 0., -204586.0),
    lt(0., 1., -1., 0., -129620.0),
    lt(1., 0., 0., 0., 108743.0),
];

/// Latitude terms, 1e-6 degree.
const LATITUDE_TERMS: [LunarTerm; 8] = [
    lt(0., 0., 0., 1., 5128122.0),
    lt(0., 0., 1., 1., 280602.0),
    lt(0., 0., 1., -1., 277693.0),
    lt(2., 0., 0., -1., 173237.0),
    lt(2., 0., -1., 1., 55413.0),
    lt(2., 0., -1., -1., 46271.0),
    lt(2., 0., 0., 1., 32573.0),
    lt(0., 0., 2., 1., 17198.0),
];

/// Mean lunar distance in km.
const MEAN_DISTANCE_KM: f64 = 385_000.56;

fn series(terms: &[LunarTerm], arguments: &[f64; 4], eccentricity: f64, use_sin: bool) -> f64 {
    terms
        .iter()
        .map(|term| {
            let arg: f64 = term
                .args
                .iter()
                .zip(arguments.iter())
                .map(|(m, a)| m * a)
                .sum();
            // terms depending on the solar anomaly M shrink with the Earth's eccentricity
            let scale = eccentricity.powi(term.args[1].abs() as i32);
            let trig = if use_sin { arg.sin() } else { arg.cos() };
            term.amplitude * scale * trig
        })
        .sum()
}

/// Geocentric ecliptic coordinates of the Moon referred to the mean equinox of date.
///
/// Returns `(λ, β, Δ)`: longitude and latitude in radians, distance in km.
pub fn lunar_ecliptic(centuries: f64) -> (f64, f64, f64) {
    let t = centuries;

    let mean_longitude = 218.3164477 + 481267.88123421 * t;
    let arguments = [
        297.8501921 + 445267.1114034 * t, // D
        357.5291092 + 35999.0502909 * t,  // M
        134.9633964 + 477198.8675055 * t, // M'
        93.2720950 + 483202.0175233 * t,  // F
    ]
    .map(|deg: f64| deg.rem_euclid(360.0) * RADEG);
    let eccentricity = 1.0 - 0.002516 * t - 0.0000074 * t * t;

    let sum_l = series(&LONGITUDE_TERMS, &arguments, eccentricity, true);
    let sum_r = series(&DISTANCE_TERMS, &arguments, eccentricity, false);
    let sum_b = series(&LATITUDE_TERMS, &arguments, eccentricity, true);

    let longitude = (mean_longitude + sum_l * 1e-6).rem_euclid(360.0) * RADEG;
    let latitude = sum_b * 1e-6 * RADEG;
    let distance = MEAN_DISTANCE_KM + sum_r / 1000.0;

    (longitude, latitude, distance)
}

/// Geocentric position of the Moon, equatorial J2000, in AU.
pub fn moon_position(centuries: f64) -> Vector3<f64> {
    let (longitude, latitude, distance) = lunar_ecliptic(centuries);

    let ecliptic_of_date = Vector3::new(
        latitude.cos() * longitude.cos(),
        latitude.cos() * longitude.sin(),
        latitude.sin(),
    ) * (distance / AU);

    let equatorial_of_date = rotmt(obleq(centuries), Axis::X) * ecliptic_of_date;
    prec(centuries).transpose() * equatorial_of_date
}

#[cfg(test)]
mod moon_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_meeus_example() {
        // Meeus example 47.a: 1992 April 12, 0h TD
        let t = -0.077221081451;
        let (longitude, latitude, distance) = lunar_ecliptic(t);

        assert_relative_eq!(longitude.to_degrees(), 133.162655, epsilon = 0.05);
        assert_relative_eq!(latitude.to_degrees(), -3.229126, epsilon = 0.05);
        assert_relative_eq!(distance, 368409.7, epsilon = 300.0);
    }

    #[test]
    fn test_distance_bounds() {
        for step in 0..100 {
            let t = 0.24 + f64::from(step) * 0.0001;
            let distance = moon_position(t).norm() * AU;
            assert!((356_000.0..407_000.0).contains(&distance), "{distance}");
        }
    }
}
