//! # Mean-elements planetary ephemeris
//!
//! Heliocentric positions from the JPL *Approximate Positions of the Planets* Keplerian
//! elements (Standish, table 1, valid 1800–2050) and the truncated lunar theory of
//! [`super::moon`].
//!
//! Each element is linear in time, `x(T) = x₀ + ẋ·T`, with `T` in Julian centuries of TT
//! since J2000.0. Kepler's equation is solved with Newton–Raphson; the orbit-plane position is
//! rotated to the J2000 ecliptic, then to the J2000 equator.
//!
//! The Earth is recovered from the Earth–Moon barycenter by removing the lunar offset
//! weighted by the Earth/Moon mass ratio.
use std::ops::RangeInclusive;

use nalgebra::Vector3;
use roots::{find_root_newton_raphson, SimpleConvergency};

use super::{moon::moon_position, Body, Ephemeris, EphemerisError};
use crate::constants::{Au, Degree, RADEG};
use crate::ref_system::{obleq, rotmt, Axis};
use crate::time::JulianInstant;

/// Earth mass over Moon mass
const EARTH_MOON_MASS_RATIO: f64 = 81.30056;

/// Validity of the element table, in Julian centuries since J2000 (1800 to 2050).
const VALID_CENTURIES: RangeInclusive<f64> = -2.0..=0.51;

/// Linear Keplerian elements: value at J2000 and rate per century.
#[derive(Debug, Clone, Copy)]
struct OrbitalElements {
    /// Semi-major axis, AU
    semi_major_axis: (Au, f64),
    eccentricity: (f64, f64),
    /// Inclination, degrees
    inclination: (Degree, f64),
    /// Mean longitude, degrees
    mean_longitude: (Degree, f64),
    /// Longitude of perihelion ϖ = Ω + ω, degrees
    perihelion_longitude: (Degree, f64),
    /// Longitude of the ascending node, degrees
    node_longitude: (Degree, f64),
}

const fn elements(rows: [(f64, f64); 6]) -> OrbitalElements {
    OrbitalElements {
        semi_major_axis: rows[0],
        eccentricity: rows[1],
        inclination: rows[2],
        mean_longitude: rows[3],
        perihelion_longitude: rows[4],
        node_longitude: rows[5],
    }
}

const MERCURY: OrbitalElements = elements([
    (0.38709927, 0.00000037),
    (0.20563593, 0.00001906),
    (7.00497902, -0.00594749),
    (252.25032350, 149472.67411175),
    (77.45779628, 0.16047689),
    (48.33076593, -0.12534081),
]);

const VENUS: OrbitalElements = elements([
    (0.72333566, 0.00000390),
    (0.00677672, -0.00004107),
    (3.39467605, -0.00078890),
    (181.97909950, 58517.81538729),
    (131.60246718, 0.00268329),
    (76.67984255, -0.27769418),
]);

const EARTH_MOON_BARYCENTER: OrbitalElements = elements([
    (1.00000261, 0.00000562),
    (0.01671123, -0.00004392),
    (-0.00001531, -0.01294668),
    (100.46457166, 35999.37244981),
    (102.93768193, 0.32327364),
    (0.0, 0.0),
]);

const MARS: OrbitalElements = elements([
    (1.52371034, 0.00001847),
    (0.09339410, 0.00007882),
    (1.84969142, -0.00813131),
    (-4.55343205, 19140.30268499),
    (-23.94362959, 0.44441088),
    (49.55953891, -0.29257343),
]);

const JUPITER: OrbitalElements = elements([
    (5.20288700, -0.00011607),
    (0.04838624, -0.00013253),
    (1.30439695, -0.00183714),
    (34.39644051, 3034.74612775),
    (14.72847983, 0.21252668),
    (100.47390909, 0.20469106),
]);

const SATURN: OrbitalElements = elements([
    (9.53667594, -0.00125060),
    (0.05386179, -0.00050991),
    (2.48599187, 0.00193609),
    (49.95424423, 1222.49362201),
    (92.59887831, -0.41897216),
    (113.66242448, -0.28867794),
]);

const URANUS: OrbitalElements = elements([
    (19.18916464, -0.00196176),
    (0.04725744, -0.00004397),
    (0.77263783, -0.00242939),
    (313.23810451, 428.48202785),
    (170.95427630, 0.40805281),
    (74.01692503, 0.04240589),
]);

const NEPTUNE: OrbitalElements = elements([
    (30.06992276, 0.00026291),
    (0.00859048, 0.00005105),
    (1.77004347, 0.00035372),
    (-55.12002969, 218.45945325),
    (44.96476227, -0.32241464),
    (131.78422574, -0.01262724),
]);

/// Solve `E − e·sin E = M` for the eccentric anomaly (radians).
pub(crate) fn solve_kepler_equation(
    mean_anomaly: f64,
    eccentricity: f64,
) -> Result<f64, EphemerisError> {
    let f = |ecc_anom: f64| ecc_anom - eccentricity * ecc_anom.sin() - mean_anomaly;
    let df = |ecc_anom: f64| 1.0 - eccentricity * ecc_anom.cos();

    let mut convergency = SimpleConvergency {
        eps: f64::EPSILON * 1e2,
        max_iter: 25,
    };

    let x0 = mean_anomaly + eccentricity * mean_anomaly.sin();
    Ok(find_root_newton_raphson(x0, &f, &df, &mut convergency)?)
}

impl OrbitalElements {
    /// Heliocentric position in the J2000 ecliptic frame, AU.
    fn heliocentric_ecliptic(&self, centuries: f64) -> Result<Vector3<f64>, EphemerisError> {
        let at = |(value, rate): (f64, f64)| value + rate * centuries;

        let a = at(self.semi_major_axis);
        let e = at(self.eccentricity);
        let incl = at(self.inclination) * RADEG;
        let mean_longitude = at(self.mean_longitude);
        let varpi = at(self.perihelion_longitude);
        let node = at(self.node_longitude) * RADEG;

        let arg_perihelion = varpi * RADEG - node;
        // M in (-180, 180]
        let mean_anomaly = ((mean_longitude - varpi + 180.0).rem_euclid(360.0) - 180.0) * RADEG;

        let ecc_anom = solve_kepler_equation(mean_anomaly, e)?;

        let orbital_plane = Vector3::new(
            a * (ecc_anom.cos() - e),
            a * (1.0 - e * e).sqrt() * ecc_anom.sin(),
            0.0,
        );

        Ok(rotmt(node, Axis::Z)
            * rotmt(incl, Axis::X)
            * rotmt(arg_perihelion, Axis::Z)
            * orbital_plane)
    }
}

/// Analytic low-precision ephemeris of the Sun, Moon and planets.
#[derive(Debug, Clone)]
pub struct MeanElementsEphemeris {
    ecliptic_to_equator: nalgebra::Matrix3<f64>,
    closed: bool,
}

impl Default for MeanElementsEphemeris {
    fn default() -> Self {
        Self::new()
    }
}

impl MeanElementsEphemeris {
    pub fn new() -> Self {
        MeanElementsEphemeris {
            ecliptic_to_equator: rotmt(obleq(0.0), Axis::X),
            closed: false,
        }
    }

    fn elements(body: Body) -> Option<&'static OrbitalElements> {
        match body {
            Body::Mercury => Some(&MERCURY),
            Body::Venus => Some(&VENUS),
            Body::Mars => Some(&MARS),
            Body::Jupiter => Some(&JUPITER),
            Body::Saturn => Some(&SATURN),
            Body::Uranus => Some(&URANUS),
            Body::Neptune => Some(&NEPTUNE),
            Body::Sun | Body::Moon => None,
        }
    }

    /// Heliocentric Earth position, equatorial J2000, AU.
    fn earth_heliocentric(&self, centuries: f64) -> Result<Vector3<f64>, EphemerisError> {
        let barycenter =
            self.ecliptic_to_equator * EARTH_MOON_BARYCENTER.heliocentric_ecliptic(centuries)?;
        Ok(barycenter - moon_position(centuries) / (1.0 + EARTH_MOON_MASS_RATIO))
    }
}

impl Ephemeris for MeanElementsEphemeris {
    fn name(&self) -> &str {
        "mean-elements"
    }

    fn geocentric_position(
        &self,
        body: Body,
        tt: &JulianInstant,
    ) -> Result<Vector3<f64>, EphemerisError> {
        if self.closed {
            return Err(EphemerisError::Closed);
        }

        let centuries = tt.centuries_since_j2000();
        if !VALID_CENTURIES.contains(&centuries) {
            return Err(EphemerisError::OutOfRange { jd: tt.to_jd() });
        }

        match body {
            Body::Moon => Ok(moon_position(centuries)),
            Body::Sun => Ok(-self.earth_heliocentric(centuries)?),
            planet => {
                let orbit = Self::elements(planet).ok_or(EphemerisError::BodyNotCovered(planet))?;
                let helio = self.ecliptic_to_equator * orbit.heliocentric_ecliptic(centuries)?;
                Ok(helio - self.earth_heliocentric(centuries)?)
            }
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
