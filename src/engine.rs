//! # Position engine
//!
//! The [`PositionEngine`] owns the prebuilt catalog and the optional ephemeris handle, and turns
//! `(observer, instant)` into sorted result lists:
//!
//! 1. **Time**: the UTC instant is converted once to a split [`JulianInstant`].
//! 2. **Frame**: one observer frame (time scales, Earth orientation, Earth state) is built and
//!    reused for every object.
//! 3. **Per object**: apparent place → horizontal transform (with refraction) → zenith
//!    distance `90 − elevation` → rising flag.
//! 4. **Ordering**: stable ascending sort by zenith distance.
//!
//! Objects whose transform fails are dropped and traced at `debug`; a frame failure yields an
//! empty list.
//!
//! ## Accuracy
//!
//! The accuracy level follows the ephemeris: [`Accuracy::Full`] with one installed,
//! [`Accuracy::Reduced`] without. It is re-evaluated every time
//! [`set_ephemeris`](PositionEngine::set_ephemeris) is called.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use zenith::catalog::{BrightStars, CatalogSource};
//! use zenith::engine::PositionEngine;
//! use zenith::ephemeris::MeanElementsEphemeris;
//! use zenith::observers::Observer;
//!
//! let mut engine = PositionEngine::new();
//! engine.set_catalog(&BrightStars.stars()?);
//! engine.set_ephemeris(Some(Box::new(MeanElementsEphemeris::new())));
//!
//! let observer = Observer::new(37.7749, -122.4194, 16.0);
//! let stars = engine.calculate_zenith_proximity(&observer, &Utc::now());
//! let bodies = engine.calculate_solar_system(&observer, &Utc::now());
//! # Ok::<(), zenith::zenith_errors::ZenithError>(())
//! ```
use std::fmt;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::astrometry::{
    Accuracy, Astrometry, AstrometryError, BuiltinAstrometry, EarthOrientation,
    HorizontalPosition, Refraction, SkyPosition,
};
use crate::catalog::Star;
use crate::constants::{Au, Degree};
use crate::ephemeris::{Body, Ephemeris};
use crate::observers::Observer;
use crate::time::{to_julian, JulianInstant};

/// One star of a zenith-proximity list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialResult {
    pub name: String,
    pub elevation: Degree,
    /// North through east, `[0, 360)`
    pub azimuth: Degree,
    /// Always `90 − elevation`
    pub zenith_distance: Degree,
    pub is_rising: bool,
}

/// One solar-system body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarBody {
    pub body: Body,
    pub name: String,
    pub elevation: Degree,
    pub azimuth: Degree,
    pub zenith_distance: Degree,
    pub is_rising: bool,
    /// Observer distance in AU
    pub distance_au: Au,
}

/// How the rising flag is decided.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum RisingCriterion {
    /// Rising when the object lies in the eastern half of the sky (`azimuth < 180°`)
    #[default]
    AzimuthHeuristic,
    /// Rising when the elevation `step_seconds` later is higher
    ElevationRate { step_seconds: f64 },
}

/// Zenith-proximity and solar-system computations over a prebuilt catalog.
pub struct PositionEngine<A: Astrometry = BuiltinAstrometry> {
    astrometry: A,
    names: Vec<String>,
    entries: Vec<A::Entry>,
    ephemeris: Option<Box<dyn Ephemeris>>,
    accuracy: Accuracy,
    earth_orientation: EarthOrientation,
    refraction: Refraction,
    rising: RisingCriterion,
    horizon_cutoff: Option<Degree>,
}

impl Default for PositionEngine<BuiltinAstrometry> {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionEngine<BuiltinAstrometry> {
    pub fn new() -> Self {
        Self::with_astrometry(BuiltinAstrometry)
    }
}

impl<A: Astrometry> fmt::Debug for PositionEngine<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionEngine")
            .field("stars", &self.entries.len())
            .field("ephemeris", &self.ephemeris.as_ref().map(|e| e.name()))
            .field("accuracy", &self.accuracy)
            .field("earth_orientation", &self.earth_orientation)
            .field("refraction", &self.refraction)
            .field("rising", &self.rising)
            .field("horizon_cutoff", &self.horizon_cutoff)
            .finish()
    }
}

impl<A: Astrometry> PositionEngine<A> {
    /// An engine with an empty catalog, no ephemeris and default settings.
    pub fn with_astrometry(astrometry: A) -> Self {
        PositionEngine {
            astrometry,
            names: Vec::new(),
            entries: Vec::new(),
            ephemeris: None,
            accuracy: Accuracy::Reduced,
            earth_orientation: EarthOrientation::default(),
            refraction: Refraction::Standard,
            rising: RisingCriterion::AzimuthHeuristic,
            horizon_cutoff: Some(0.0),
        }
    }

    pub fn with_earth_orientation(mut self, earth_orientation: EarthOrientation) -> Self {
        self.earth_orientation = earth_orientation;
        self
    }

    pub fn with_refraction(mut self, refraction: Refraction) -> Self {
        self.refraction = refraction;
        self
    }

    pub fn with_rising_criterion(mut self, rising: RisingCriterion) -> Self {
        self.rising = rising;
        self
    }

    /// Keep only stars strictly above `cutoff` degrees; `None` keeps every star.
    ///
    /// Solar-system bodies are never cut.
    pub fn with_horizon_cutoff(mut self, cutoff: Option<Degree>) -> Self {
        self.horizon_cutoff = cutoff;
        self
    }

    /// Replace the catalog, rebuilding every prebuilt entry.
    pub fn set_catalog(&mut self, stars: &[Star]) {
        self.names = stars.iter().map(|s| s.name.clone()).collect();
        self.entries = stars.iter().map(|s| self.astrometry.prebuild(s)).collect();
        info!(stars = self.entries.len(), "catalog rebuilt");
    }

    /// Install or remove the ephemeris.
    ///
    /// The previous handle, if any, is closed. The accuracy level is re-evaluated right away.
    pub fn set_ephemeris(&mut self, ephemeris: Option<Box<dyn Ephemeris>>) {
        if let Some(mut previous) = self.ephemeris.take() {
            previous.close();
            info!(ephemeris = previous.name(), "ephemeris closed");
        }

        self.ephemeris = ephemeris;
        self.accuracy = match &self.ephemeris {
            Some(eph) => {
                info!(ephemeris = eph.name(), "ephemeris installed");
                Accuracy::Full
            }
            None => Accuracy::Reduced,
        };
        info!(accuracy = ?self.accuracy, "accuracy initialized");
    }

    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    pub fn has_ephemeris(&self) -> bool {
        self.ephemeris.is_some()
    }

    pub fn catalog_len(&self) -> usize {
        self.entries.len()
    }

    fn frame(&self, observer: &Observer, utc: &JulianInstant) -> Result<A::Frame, AstrometryError> {
        self.astrometry.make_frame(
            observer,
            utc,
            self.accuracy,
            &self.earth_orientation,
            self.ephemeris.as_deref(),
        )
    }

    fn horizontal(
        &self,
        frame: &A::Frame,
        sky: Result<SkyPosition, AstrometryError>,
    ) -> Result<HorizontalPosition, AstrometryError> {
        self.astrometry.to_horizontal(frame, &sky?, self.refraction)
    }

    fn is_rising(&self, now: &HorizontalPosition, later: Option<&HorizontalPosition>) -> bool {
        match (self.rising, later) {
            (RisingCriterion::ElevationRate { .. }, Some(later)) => later.elevation > now.elevation,
            _ => now.azimuth < 180.0,
        }
    }

    /// Frame at `utc + step` when the rising criterion needs one.
    fn later_frame(&self, observer: &Observer, utc: &JulianInstant) -> Option<A::Frame> {
        match self.rising {
            RisingCriterion::AzimuthHeuristic => None,
            RisingCriterion::ElevationRate { step_seconds } => self
                .frame(observer, &utc.offset_seconds(step_seconds))
                .map_err(|err| debug!(%err, "no look-ahead frame, using the azimuth heuristic"))
                .ok(),
        }
    }

    /// Catalog stars sorted by increasing distance from the observer's zenith.
    pub fn calculate_zenith_proximity(
        &self,
        observer: &Observer,
        instant: &DateTime<Utc>,
    ) -> Vec<CelestialResult> {
        if self.entries.is_empty() {
            return Vec::new();
        }

        let utc = to_julian(instant);
        let frame = match self.frame(observer, &utc) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, %observer, "cannot build observer frame");
                return Vec::new();
            }
        };
        let later = self.later_frame(observer, &utc);

        self.names
            .iter()
            .zip(self.entries.iter())
            .filter_map(|(name, entry)| {
                let place = |frame: &A::Frame| {
                    self.horizontal(frame, self.astrometry.star_position(entry, frame))
                };

                let hor = place(&frame)
                    .map_err(|err| debug!(star = %name, %err, "star dropped"))
                    .ok()?;
                let hor_later = later.as_ref().and_then(|f| place(f).ok());

                Some(CelestialResult {
                    name: name.clone(),
                    elevation: hor.elevation,
                    azimuth: hor.azimuth,
                    zenith_distance: 90.0 - hor.elevation,
                    is_rising: self.is_rising(&hor, hor_later.as_ref()),
                })
            })
            .filter(|r| self.horizon_cutoff.map_or(true, |cutoff| r.elevation > cutoff))
            .sorted_by(|a, b| a.zenith_distance.total_cmp(&b.zenith_distance))
            .collect()
    }

    /// The Sun, plus the Moon and planets when an ephemeris is installed, sorted by zenith
    /// distance.
    pub fn calculate_solar_system(
        &self,
        observer: &Observer,
        instant: &DateTime<Utc>,
    ) -> Vec<SolarBody> {
        let utc = to_julian(instant);
        let frame = match self.frame(observer, &utc) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, %observer, "cannot build observer frame");
                return Vec::new();
            }
        };
        let later = self.later_frame(observer, &utc);
        let ephemeris = self.ephemeris.as_deref();

        let full = self.astrometry.frame_accuracy(&frame) == Accuracy::Full;
        if ephemeris.is_some() && !full {
            debug!(instant = %instant, "ephemeris does not cover this instant, Sun only");
        }
        let bodies: &[Body] = if ephemeris.is_some() && full {
            &Body::ALL
        } else {
            &[Body::Sun]
        };

        bodies
            .iter()
            .filter_map(|&body| {
                let sky = self
                    .astrometry
                    .body_position(body, &frame, ephemeris)
                    .map_err(|err| debug!(%body, %err, "body dropped"))
                    .ok()?;
                let Some(distance_au) = sky.distance else {
                    debug!(%body, "body dropped, no distance");
                    return None;
                };
                let hor = self
                    .horizontal(&frame, Ok(sky))
                    .map_err(|err| debug!(%body, %err, "body dropped"))
                    .ok()?;
                let hor_later = later.as_ref().and_then(|f| {
                    self.horizontal(f, self.astrometry.body_position(body, f, ephemeris))
                        .ok()
                });

                Some(SolarBody {
                    body,
                    name: body.name().to_string(),
                    elevation: hor.elevation,
                    azimuth: hor.azimuth,
                    zenith_distance: 90.0 - hor.elevation,
                    is_rising: self.is_rising(&hor, hor_later.as_ref()),
                    distance_au,
                })
            })
            .sorted_by(|a, b| a.zenith_distance.total_cmp(&b.zenith_distance))
            .collect()
    }
}

impl<A: Astrometry> Drop for PositionEngine<A> {
    fn drop(&mut self) {
        if let Some(eph) = self.ephemeris.as_mut() {
            eph.close();
        }
    }
}
