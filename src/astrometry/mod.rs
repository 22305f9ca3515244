//! # Astrometry capability
//!
//! The [`Astrometry`] trait is the seam between the [`PositionEngine`](crate::engine::PositionEngine)
//! and whatever computes apparent places. An implementation provides:
//!
//! 1. [`prebuild`](Astrometry::prebuild): a per-star precomputed entry, built once per catalog.
//! 2. [`make_frame`](Astrometry::make_frame): everything that depends only on the observer and
//!    the instant (time scales, Earth orientation, Earth state), built once per computation.
//! 3. [`star_position`](Astrometry::star_position) / [`body_position`](Astrometry::body_position):
//!    apparent right ascension and declination in the **true equator and equinox of date**.
//! 4. [`to_horizontal`](Astrometry::to_horizontal): local azimuth/elevation, optionally refracted.
//!
//! Implementations are deterministic and side-effect free; failures are reported per object
//! through [`AstrometryError`].
//!
//! [`BuiltinAstrometry`] is the reduced-accuracy implementation shipped with the crate.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Star;
use crate::constants::{
    Au, Degree, MilliArcSec, DEFAULT_DUT1, DEFAULT_POLAR_X, DEFAULT_POLAR_Y,
};
use crate::ephemeris::{Body, Ephemeris, EphemerisError};
use crate::observers::Observer;
use crate::time::JulianInstant;

pub mod builtin;
pub mod solar;

pub use builtin::{BuiltinAstrometry, BuiltinFrame, StarEntry};

/// Nutation series truncation and ephemeris use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Accuracy {
    /// Full nutation series, solar-system bodies from the ephemeris
    Full,
    /// Leading nutation terms, analytic Sun only
    #[default]
    Reduced,
}

/// Earth orientation parameters applied to every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarthOrientation {
    /// UT1 − UTC in seconds
    pub dut1: f64,
    /// Polar motion x in milliarcseconds
    pub polar_x: MilliArcSec,
    /// Polar motion y in milliarcseconds
    pub polar_y: MilliArcSec,
}

impl Default for EarthOrientation {
    fn default() -> Self {
        EarthOrientation {
            dut1: DEFAULT_DUT1,
            polar_x: DEFAULT_POLAR_X,
            polar_y: DEFAULT_POLAR_Y,
        }
    }
}

/// Atmospheric refraction model applied by [`Astrometry::to_horizontal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Refraction {
    /// Geometric elevation
    None,
    /// Standard atmosphere (10 °C, 1010 hPa at sea level, scaled with altitude)
    #[default]
    Standard,
}

/// Apparent place, true equator and equinox of date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPosition {
    pub ra: Degree,
    pub dec: Degree,
    /// Observer distance, known for solar-system bodies only
    pub distance: Option<Au>,
}

/// Local horizontal coordinates. Azimuth is measured from north through east, in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalPosition {
    pub azimuth: Degree,
    pub elevation: Degree,
}

#[derive(Error, Debug)]
pub enum AstrometryError {
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("No ephemeris available for {0}")]
    EphemerisUnavailable(Body),

    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}

/// Apparent-place computation, see the module documentation.
pub trait Astrometry: Send + Sync {
    /// Precomputed representation of a catalog star.
    type Entry: Send + Sync;
    /// Observer- and instant-dependent state shared by every object of one computation.
    type Frame;

    fn prebuild(&self, star: &Star) -> Self::Entry;

    fn make_frame(
        &self,
        observer: &Observer,
        utc: &JulianInstant,
        accuracy: Accuracy,
        eop: &EarthOrientation,
        ephemeris: Option<&dyn Ephemeris>,
    ) -> Result<Self::Frame, AstrometryError>;

    /// Accuracy the frame was built at.
    ///
    /// Drops to [`Accuracy::Reduced`] when the ephemeris cannot serve the frame's instant;
    /// only [`Body::Sun`] is then available.
    fn frame_accuracy(&self, frame: &Self::Frame) -> Accuracy;

    fn star_position(
        &self,
        entry: &Self::Entry,
        frame: &Self::Frame,
    ) -> Result<SkyPosition, AstrometryError>;

    /// Topocentric apparent place of a solar-system body.
    ///
    /// Without an ephemeris only [`Body::Sun`] is available.
    fn body_position(
        &self,
        body: Body,
        frame: &Self::Frame,
        ephemeris: Option<&dyn Ephemeris>,
    ) -> Result<SkyPosition, AstrometryError>;

    fn to_horizontal(
        &self,
        frame: &Self::Frame,
        sky: &SkyPosition,
        refraction: Refraction,
    ) -> Result<HorizontalPosition, AstrometryError>;
}
