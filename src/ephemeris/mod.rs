//! # Solar-system ephemerides
//!
//! The [`Ephemeris`] capability returns **geometric geocentric** positions of the Sun, the Moon
//! and the eight planets, in AU, referred to the mean equator and equinox of J2000 (ICRS
//! aligned). Light-time and aberration are the caller's business.
//!
//! An ephemeris is an owned handle: [`Ephemeris::close`] releases whatever it holds and any
//! later query fails with [`EphemerisError::Closed`].
//!
//! [`MeanElementsEphemeris`] is the bundled analytic implementation.
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::JulianInstant;

pub mod mean_elements;
pub mod moon;

pub use mean_elements::MeanElementsEphemeris;

/// Solar-system bodies reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Body {
    /// Every tracked body, in display order.
    pub const ALL: [Body; 9] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug)]
pub enum EphemerisError {
    #[error("{0} is not covered by this ephemeris")]
    BodyNotCovered(Body),

    #[error("Epoch JD {jd:.5} (TT) is outside the ephemeris validity range")]
    OutOfRange { jd: f64 },

    #[error("Kepler equation did not converge: {0}")]
    KeplerNotConverged(#[from] roots::SearchError),

    #[error("Ephemeris handle has been closed")]
    Closed,
}

/// A source of geocentric solar-system positions.
pub trait Ephemeris: Send + Sync + fmt::Debug {
    /// Short human-readable identifier, used in logs.
    fn name(&self) -> &str;

    /// Geometric geocentric position of `body` at `tt`, equatorial J2000, in AU.
    fn geocentric_position(
        &self,
        body: Body,
        tt: &JulianInstant,
    ) -> Result<Vector3<f64>, EphemerisError>;

    /// Release the handle. Idempotent.
    fn close(&mut self) {}
}
