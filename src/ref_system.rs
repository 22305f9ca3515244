//! # Reference frames and Earth orientation
//!
//! Rotation matrices between the **ICRS-aligned mean equator of J2000** and the
//! **true equator and equinox of date**, plus the spherical/Cartesian helpers used by the
//! astrometric pipeline.
//!
//! ```text
//! J2000 mean  --P (IAU 1976 precession)-->  mean of date  --N (IAU 1980 nutation)-->  true of date
//! ```
//!
//! All series take the time argument as **Julian centuries of TT since J2000.0**.
//! Rotations are *active* ([`nalgebra::Rotation3::from_axis_angle`]): `x' = R · x` rotates the
//! vector in a fixed frame.
use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::astrometry::Accuracy;
use crate::constants::{ArcSec, Degree, Radian, DPI, RADEG, RADSEC, VLIGHT_AU};

/// Principal axis of an elementary rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Active rotation by `alpha` radians around a principal axis.
pub fn rotmt(alpha: Radian, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Mean obliquity of the ecliptic (IAU 1976), in radians.
///
/// `ε = ε₀ + ε₁·T + ε₂·T² + ε₃·T³`, evaluated with Horner's scheme.
pub fn obleq(centuries: f64) -> Radian {
    let ob0 = ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.0006 * RADSEC;
    let ob3 = 0.00181 * RADSEC;

    ((ob3 * centuries + ob2) * centuries + ob1) * centuries + ob0
}

/// Precession matrix from the J2000 mean equator to the mean equator of date (IAU 1976).
///
/// The equatorial precession angles ζ, z, θ are cubic polynomials of `T`; the matrix is
/// `Rz(z) · Ry(−θ) · Rz(ζ)` in the active convention.
pub fn prec(centuries: f64) -> Matrix3<f64> {
    let t = centuries;

    let zeta = ((0.0000050 * t + 0.0000839) * t + 0.6406161) * t * RADEG;
    let z = ((0.0000051 * t + 0.0003041) * t + 0.6406161) * t * RADEG;
    let theta = ((-0.0000116 * t - 0.0001185) * t + 0.5567530) * t * RADEG;

    rotmt(z, Axis::Z) * rotmt(-theta, Axis::Y) * rotmt(zeta, Axis::Z)
}

/// One periodic term of the IAU 1980 nutation series.
///
/// Multipliers of (l, l', F, D, Ω), then Δψ and Δε coefficients in units of 0.0001″
/// with their secular rates per century.
struct NutationTerm {
    args: [f64; 5],
    psi: (f64, f64),
    eps: (f64, f64),
}

const fn term(args: [f64; 5], psi: (f64, f64), eps: (f64, f64)) -> NutationTerm {
    NutationTerm { args, psi, eps }
}

/// Largest terms of the IAU 1980 series, sorted by decreasing amplitude.
const NUTATION_TERMS: [NutationTerm; 18] = [
    term([0., 0., 0., 0., 1.], (-171996.0, -174.2), (92025.0, 8.9)),
    term([0., 0., 2., -2., 2.], (-13187.0, -1.6), (5736.0, -3.1)),
    term([0., 0., 2., 0., 2.], (-2274.0, -0.2), (977.0, -0.5)),
    term([0., 0., 0., 0., 2.], (2062.0, 0.2), (-895.0, 0.5)),
    term([0., 1., 0., 0., 0.], (1426.0, -3.4), (54.0, -0.1)),
    term([1., 0., 0., 0., 0.], (712.0, 0.1), (-7.0, 0.0)),
    term([0., 1., 2., -2., 2.], (-517.0, 1.2), (224.0, -0.6)),
    term([0., 0., 2., 0., 1.], (-386.0, -0.4), (200.0, 0.0)),
    term([1., 0., 2., 0., 2.], (-301.0, 0.0), (129.0, -0.1)),
    term([0., -1., 2., -2., 2.], (217.0, -0.5), (-95.0, 0.3)),
    term([1., 0., 0., -2., 0.], (-158.0, 0.0), (0.0, 0.0)),
    term([0., 0., 2., -2., 1.], (129.0, 0.1), (-70.0, 0.0)),
    term([-1., 0., 2., 0., 2.], (123.0, 0.0), (-53.0, 0.0)),
    term([1., 0., 0., 0., 1.], (63.0, 0.1), (-33.0, 0.0)),
    term([0., 0., 0., 2., 0.], (63.0, 0.0), (0.0, 0.0)),
    term([-1., 0., 2., 2., 2.], (-59.0, 0.0), (26.0, 0.0)),
    term([-1., 0., 0., 0., 1.], (-58.0, -0.1), (32.0, 0.0)),
    term([1., 0., 2., 0., 1.], (-51.0, 0.0), (27.0, 0.0)),
];

/// Number of series terms evaluated in reduced-accuracy mode.
const REDUCED_NUTATION_TERMS: usize = 5;

/// Nutation in longitude and obliquity (Δψ, Δε), in arcseconds.
///
/// Fundamental lunar and solar arguments follow the IAU 1980 theory (Wahr); the series is
/// truncated to its largest terms, fewer of them in [`Accuracy::Reduced`] mode.
pub fn nutation(centuries: f64, accuracy: Accuracy) -> (ArcSec, ArcSec) {
    let t = centuries;
    let t2 = t * t;
    let t3 = t2 * t;

    let fundamental = [
        // l: mean anomaly of the Moon
        (485866.733 + 1717915922.633 * t + 31.310 * t2 + 0.064 * t3) * RADSEC,
        // l': mean anomaly of the Sun
        (1287099.804 + 129596581.224 * t - 0.577 * t2 - 0.012 * t3) * RADSEC,
        // F: Moon's argument of latitude
        (335778.877 + 1739527263.137 * t - 13.257 * t2 + 0.011 * t3) * RADSEC,
        // D: mean elongation of the Moon from the Sun
        (1072261.307 + 1602961601.328 * t - 6.891 * t2 + 0.019 * t3) * RADSEC,
        // Ω: longitude of the Moon's ascending node
        (450160.280 - 6962890.539 * t + 7.455 * t2 + 0.008 * t3) * RADSEC,
    ]
    .map(|x| x % DPI);

    let terms = match accuracy {
        Accuracy::Full => &NUTATION_TERMS[..],
        Accuracy::Reduced => &NUTATION_TERMS[..REDUCED_NUTATION_TERMS],
    };

    let (dpsi, deps) = terms.iter().fold((0.0, 0.0), |(dpsi, deps), term| {
        let arg: f64 = term
            .args
            .iter()
            .zip(fundamental.iter())
            .map(|(m, a)| m * a)
            .sum();
        (
            dpsi + (term.psi.0 + term.psi.1 * t) * arg.sin(),
            deps + (term.eps.0 + term.eps.1 * t) * arg.cos(),
        )
    });

    // coefficients are in units of 0.0001 arcsecond
    (dpsi * 1e-4, deps * 1e-4)
}

/// Nutation matrix from the mean equator of date to the true equator of date.
///
/// `N = Rx(ε + Δε) · Rz(Δψ) · Rx(−ε)`
pub fn rnut(centuries: f64, accuracy: Accuracy) -> Matrix3<f64> {
    let epsm = obleq(centuries);
    let (dpsi, deps) = nutation(centuries, accuracy);
    let epst = epsm + deps * RADSEC;

    rotmt(epst, Axis::X) * rotmt(dpsi * RADSEC, Axis::Z) * rotmt(-epsm, Axis::X)
}

/// Equation of the equinoxes `Δψ · cos(ε)`, in radians.
pub fn equequ(centuries: f64, accuracy: Accuracy) -> Radian {
    let (dpsi, _deps) = nutation(centuries, accuracy);
    RADSEC * dpsi * obleq(centuries).cos()
}

/// Unit vector pointing at (α, δ), angles in radians.
pub fn radec_to_unit(ra: Radian, dec: Radian) -> Vector3<f64> {
    Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
}

/// Convert a Cartesian vector to right ascension, declination and norm.
///
/// Returns `(α ∈ [0, 2π), δ ∈ [−π/2, π/2], ρ)`; a null vector yields `(0, 0, 0)`.
pub fn cartesian_to_radec(cartesian_position: Vector3<f64>) -> (Radian, Radian, f64) {
    let pos_norm = cartesian_position.norm();
    if pos_norm == 0. {
        return (0.0, 0.0, pos_norm);
    }

    let delta = (cartesian_position.z / pos_norm).clamp(-1.0, 1.0).asin();
    let alpha = cartesian_position.y.atan2(cartesian_position.x);
    (alpha.rem_euclid(DPI), delta, pos_norm)
}

/// First-order annual aberration of a unit direction.
///
/// * `direction`: unit vector toward the source.
/// * `observer_velocity`: observer velocity in AU/day, same frame as `direction`.
///
/// Returns the apparent unit direction `p + v/c − (p·v/c) p`, renormalized.
pub fn annual_aberration(
    direction: &Vector3<f64>,
    observer_velocity: &Vector3<f64>,
) -> Vector3<f64> {
    let beta = observer_velocity / VLIGHT_AU;
    let shifted = direction + beta - direction.dot(&beta) * direction;
    shifted.normalize()
}

/// Normalize an angle in degrees to `[0, 360)`.
///
/// `rem_euclid` alone returns `360.0` for tiny negative inputs.
pub fn normalize_degrees(angle: Degree) -> Degree {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod ref_system_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_obliquity() {
        let obl = obleq(0.0);
        assert_eq!(obl, 0.40909280422232897)
    }

    #[test]
    fn test_nutation_at_j2000() {
        // Full IAU 1980 series gives Δψ = −13.923″, Δε = −5.774″ at J2000
        let (dpsi, deps) = nutation(0.0, Accuracy::Full);
        assert_relative_eq!(dpsi, -13.923, epsilon = 0.05);
        assert_relative_eq!(deps, -5.774, epsilon = 0.05);

        let (dpsi_reduced, _) = nutation(0.0, Accuracy::Reduced);
        assert_relative_eq!(dpsi_reduced, dpsi, epsilon = 0.2);
    }

    #[test]
    fn test_precession_moves_vega() {
        // Vega J2000 → mean of date 2024.5
        let p = prec(0.245) * radec_to_unit(279.235 * RADEG, 38.784 * RADEG);
        let (ra, dec, _) = cartesian_to_radec(p);
        assert_relative_eq!(ra.to_degrees(), 279.44073, epsilon = 1e-4);
        assert_relative_eq!(dec.to_degrees(), 38.80613, epsilon = 1e-4);
    }

    #[test]
    fn test_rotations_are_orthonormal() {
        let pn = rnut(0.25, Accuracy::Full) * prec(0.25);
        let identity = pn * pn.transpose();
        assert_relative_eq!(identity, Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_equequ_is_small() {
        let eqeq = equequ(0.25, Accuracy::Full);
        assert!(eqeq.abs() / RADSEC < 20.0);
    }

    #[test]
    fn test_cartesian_to_radec() {
        let (ra, dec, rho) = cartesian_to_radec(Vector3::new(0.0, -2.0, 0.0));
        assert_relative_eq!(ra, 1.5 * std::f64::consts::PI);
        assert_eq!(dec, 0.0);
        assert_eq!(rho, 2.0);

        assert_eq!(cartesian_to_radec(Vector3::zeros()), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_annual_aberration_magnitude() {
        // ~30 km/s perpendicular to the line of sight shifts by ~20.5″
        let direction = Vector3::new(1.0, 0.0, 0.0);
        let velocity = Vector3::new(0.0, 0.0172, 0.0);
        let apparent = annual_aberration(&direction, &velocity);
        let shift = direction.angle(&apparent) / RADSEC;
        assert_relative_eq!(shift, 20.5, epsilon = 0.5);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-1e-17), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
    }
}
