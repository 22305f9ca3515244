//! # Observer & location sources
//!
//! - [`Observer`]: geodetic site (latitude, longitude, altitude) used for every computation.
//! - [`geodetic_to_parallax`]: geodetic latitude/altitude → normalized parallax coordinates
//!   (ρ·cosφ′, ρ·sinφ′), accounting for the Earth's oblateness.
//! - [`LocationProvider`]: capability yielding the current observer, with a fixed
//!   ([`StaticLocationProvider`]) and a sampled ([`SampledLocationProvider`]) variant.
//!
//! ## Units
//!
//! - Latitude, longitude: **degrees** (north/east positive).
//! - Altitude: **meters** above the reference ellipsoid.
//! - Body-fixed position: **AU**.
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Meter, Radian, EARTH_MAJOR_AXIS, EARTH_MINOR_AXIS, ERAU};
use crate::zenith_errors::ZenithError;

/// A geodetic observing site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    /// Geodetic latitude in degrees, north positive
    pub latitude: Degree,
    /// Longitude in degrees east of Greenwich
    pub longitude: Degree,
    /// Height above the ellipsoid in meters
    pub altitude: Meter,
}

impl Observer {
    pub fn new(latitude: Degree, longitude: Degree, altitude: Meter) -> Self {
        Observer {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Earth-fixed geocentric position of the site, in AU.
    ///
    /// The x axis points to the Greenwich meridian, z to the conventional pole.
    pub fn body_fixed_coord(&self) -> Vector3<f64> {
        let (pxy1, pz1) = geodetic_to_parallax(self.latitude, self.altitude);
        let lon_radians = self.longitude.to_radians();

        Vector3::new(
            ERAU * pxy1 * lon_radians.cos(),
            ERAU * pxy1 * lon_radians.sin(),
            ERAU * pz1,
        )
    }
}

impl fmt::Display for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat {:.4}° lon {:.4}° alt {:.1} m",
            self.latitude, self.longitude, self.altitude
        )
    }
}

/// Convert geodetic latitude (radians) and height (meters) into parallax coordinates.
///
/// ```text
/// u = atan( (sin φ * (b/a)) / cos φ )
/// ρ_sinφ = (b/a) * sin u + (h/a) * sin φ
/// ρ_cosφ = cos u + (h/a) * cos φ
/// ```
///
/// where `a` and `b` are the Earth's semi-major and semi-minor axes.
pub fn lat_alt_to_parallax(lat: Radian, height: Meter) -> (f64, f64) {
    let axis_ratio = EARTH_MINOR_AXIS / EARTH_MAJOR_AXIS;

    // parametric latitude
    let u = (lat.sin() * axis_ratio).atan2(lat.cos());

    let rho_sin_phi = axis_ratio * u.sin() + (height / EARTH_MAJOR_AXIS) * lat.sin();
    let rho_cos_phi = u.cos() + (height / EARTH_MAJOR_AXIS) * lat.cos();

    (rho_cos_phi, rho_sin_phi)
}

/// Convert geodetic latitude (degrees) and height (meters) into parallax coordinates.
///
/// Returns `(rho_cos_phi, rho_sin_phi)` in Earth equatorial radii.
pub fn geodetic_to_parallax(lat: Degree, height: Meter) -> (f64, f64) {
    lat_alt_to_parallax(lat.to_radians(), height)
}

/// A source of the observer's current position.
///
/// Implementations are shared between the producer thread and the display, hence
/// `Send + Sync`.
pub trait LocationProvider: Send + Sync {
    /// The current observer.
    ///
    /// Errors
    /// ------
    /// * [`ZenithError::LocationUnavailable`] when no fix can be produced right now.
    fn get_location(&self) -> Result<Observer, ZenithError>;

    /// Whether positions come from a live sampled source rather than a fixed site.
    fn is_live(&self) -> bool {
        false
    }
}

/// Always returns the same observer.
#[derive(Debug, Clone, Copy)]
pub struct StaticLocationProvider {
    observer: Observer,
}

impl StaticLocationProvider {
    pub fn new(observer: Observer) -> Self {
        StaticLocationProvider { observer }
    }
}

impl LocationProvider for StaticLocationProvider {
    fn get_location(&self) -> Result<Observer, ZenithError> {
        Ok(self.observer)
    }
}

type Sampler = Box<dyn Fn() -> Option<Observer> + Send + Sync>;

/// Delegates to a sampling closure, e.g. a wrapper around an OS location service.
///
/// A sampler returning `None` is reported as [`ZenithError::LocationUnavailable`].
pub struct SampledLocationProvider {
    name: String,
    sampler: Sampler,
}

impl SampledLocationProvider {
    pub fn new<F>(name: impl Into<String>, sampler: F) -> Self
    where
        F: Fn() -> Option<Observer> + Send + Sync + 'static,
    {
        SampledLocationProvider {
            name: name.into(),
            sampler: Box::new(sampler),
        }
    }
}

impl fmt::Debug for SampledLocationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampledLocationProvider")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl LocationProvider for SampledLocationProvider {
    fn get_location(&self) -> Result<Observer, ZenithError> {
        (self.sampler)().ok_or_else(|| {
            ZenithError::LocationUnavailable(format!("{} returned no fix", self.name))
        })
    }

    fn is_live(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod observers_test {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn geodetic_to_parallax_test() {
        // latitude and height of Pan-STARRS 1, Haleakala
        let (pxy1, pz1) = geodetic_to_parallax(20.707233557, 3067.694);
        assert_eq!(pxy1, 0.9362410003211518);
        assert_eq!(pz1, 0.35154299856304305);
    }

    #[test]
    fn test_equator_parallax() {
        let (pxy1, pz1) = geodetic_to_parallax(0.0, 0.0);
        assert_eq!(pxy1, 1.0);
        assert_eq!(pz1, 0.0);
    }

    #[test]
    fn body_fixed_coord_test() {
        // longitude, latitude and height of Pan-STARRS 1, Haleakala
        let pan_starrs = Observer::new(20.707233557, 203.744090000, 3067.694);
        let obs_fixed_vector = pan_starrs.body_fixed_coord();
        assert_relative_eq!(
            obs_fixed_vector,
            Vector3::new(
                -0.00003653799439776371,
                -0.00001607260397528885,
                0.000014988110430544328
            ),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_static_provider() {
        let obs = Observer::new(37.7749, -122.4194, 16.0);
        let provider = StaticLocationProvider::new(obs);
        assert_eq!(provider.get_location(), Ok(obs));
        assert!(!provider.is_live());
    }

    #[test]
    fn test_sampled_provider_drifts() {
        let calls = AtomicU32::new(0);
        let provider = SampledLocationProvider::new("drift", move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Some(Observer::new(0.0, 0.001 * f64::from(n), 0.0))
        });

        let first = provider.get_location().unwrap();
        let second = provider.get_location().unwrap();
        assert!(second.longitude > first.longitude);
        assert!(provider.is_live());
    }

    #[test]
    fn test_sampled_provider_without_fix() {
        let provider = SampledLocationProvider::new("gps", || None);
        assert_eq!(
            provider.get_location(),
            Err(ZenithError::LocationUnavailable(
                "gps returned no fix".to_string()
            ))
        );
    }
}
