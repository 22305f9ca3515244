//! # Built-in reduced-accuracy astrometry
//!
//! Star pipeline, ICRS catalog place → horizontal:
//!
//! ```text
//! space motion (J2000 → t)  →  annual parallax  →  annual aberration  →  P·N  →  hour angle  →  (az, el) + refraction
//! ```
//!
//! Solar-system bodies are retarded by the light-time (which absorbs planetary aberration to
//! first order) and made topocentric before the same precession-nutation and horizontal steps.
//!
//! The frame carries the true-of-date rotation, Greenwich apparent sidereal time, the
//! polar-motion corrected site and the Earth's heliocentric state, so the per-object work is a
//! handful of vector operations.
use nalgebra::{Matrix3, Vector3};
use tracing::debug;

use super::{
    solar, Accuracy, Astrometry, AstrometryError, EarthOrientation, HorizontalPosition,
    Refraction, SkyPosition,
};
use crate::catalog::Star;
use crate::constants::{
    Degree, Meter, Radian, DAYS_PER_YEAR, DPI, KMS_TO_AU_PER_DAY, RADEG, RADMAS, SECONDS_PER_DAY,
    VLIGHT_AU,
};
use crate::ephemeris::{Body, Ephemeris, EphemerisError};
use crate::observers::Observer;
use crate::ref_system::{
    annual_aberration, cartesian_to_radec, equequ, normalize_degrees, prec, radec_to_unit, rnut,
    rotmt, Axis,
};
use crate::time::{gmst, tt_minus_utc, JulianInstant};

/// Half-width of the central difference used for the Earth's velocity, in days.
const VELOCITY_STEP_DAYS: f64 = 0.5;

/// Atmospheric scale height used to thin refraction with site altitude, in meters.
const REFRACTION_SCALE_HEIGHT: Meter = 8_434.5;

/// Catalog star prepared for repeated evaluation.
///
/// With a known parallax the position is in AU and the velocity in AU/day; otherwise the star
/// is at infinity and both are unit-sphere quantities (velocity in rad/day).
#[derive(Debug, Clone, PartialEq)]
pub struct StarEntry {
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    parallax: Radian,
}

/// Observer- and instant-dependent state of one computation.
#[derive(Debug, Clone)]
pub struct BuiltinFrame {
    tt: JulianInstant,
    accuracy: Accuracy,
    /// J2000 mean equator → true equator of date
    precession_nutation: Matrix3<f64>,
    /// Greenwich apparent sidereal time
    gast: Radian,
    latitude: Radian,
    longitude: Radian,
    altitude: Meter,
    /// Observer geocentric position, equatorial J2000, AU
    observer_geocentric: Vector3<f64>,
    /// Earth heliocentric position, equatorial J2000, AU
    earth_position: Vector3<f64>,
    /// Earth heliocentric velocity, equatorial J2000, AU/day
    earth_velocity: Vector3<f64>,
}

impl BuiltinFrame {
    pub fn tt(&self) -> &JulianInstant {
        &self.tt
    }

    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    /// Local apparent sidereal time, radians in `[0, 2π)`.
    pub fn local_sidereal_time(&self) -> Radian {
        (self.gast + self.longitude).rem_euclid(DPI)
    }

    pub fn earth_velocity(&self) -> &Vector3<f64> {
        &self.earth_velocity
    }
}

/// Refraction for a true elevation (Sæmundsson), in degrees.
///
/// Evaluated for a standard atmosphere at sea level and thinned exponentially with the site
/// altitude. Zero below −1°.
pub fn refraction_correction(elevation: Degree, altitude: Meter) -> Degree {
    if elevation < -1.0 {
        return 0.0;
    }
    let arcmin = 1.02 / ((elevation + 10.3 / (elevation + 5.11)) * RADEG).tan();
    (arcmin / 60.0 * (-altitude.max(0.0) / REFRACTION_SCALE_HEIGHT).exp()).max(0.0)
}

/// Latitude and longitude corrected for polar motion (radians).
fn polar_motion_site(
    latitude: Radian,
    longitude: Radian,
    eop: &EarthOrientation,
) -> (Radian, Radian) {
    let xp = eop.polar_x * RADMAS;
    let yp = eop.polar_y * RADMAS;

    let corrected_latitude = latitude + xp * longitude.cos() - yp * longitude.sin();
    // the longitude correction diverges at the poles where longitude is meaningless
    let corrected_longitude = if latitude.cos().abs() > 1e-6 {
        longitude + (xp * longitude.sin() + yp * longitude.cos()) * latitude.tan()
    } else {
        longitude
    };
    (corrected_latitude, corrected_longitude)
}

fn ensure_finite(v: &Vector3<f64>, what: &'static str) -> Result<(), AstrometryError> {
    if v.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(AstrometryError::NonFinite(what))
    }
}

/// The crate's own [`Astrometry`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinAstrometry;

impl BuiltinAstrometry {
    /// Heliocentric Earth position and velocity, and whether the ephemeris supplied them.
    ///
    /// Taken from the ephemeris Sun when it answers, otherwise from the almanac Sun.
    fn earth_state(
        tt: &JulianInstant,
        ephemeris: Option<&dyn Ephemeris>,
    ) -> (Vector3<f64>, Vector3<f64>, bool) {
        let before = tt.offset_seconds(-VELOCITY_STEP_DAYS * SECONDS_PER_DAY);
        let after = tt.offset_seconds(VELOCITY_STEP_DAYS * SECONDS_PER_DAY);

        let from_ephemeris = ephemeris.map(|eph| -> Result<_, EphemerisError> {
            Ok((
                eph.geocentric_position(Body::Sun, tt)?,
                eph.geocentric_position(Body::Sun, &before)?,
                eph.geocentric_position(Body::Sun, &after)?,
            ))
        });

        let ((sun, sun_before, sun_after), from_ephemeris) = match from_ephemeris {
            Some(Ok(samples)) => (samples, true),
            Some(Err(err)) => {
                debug!(%err, "ephemeris Sun unavailable, falling back to the almanac Sun");
                (Self::almanac_samples(tt, &before, &after), false)
            }
            None => (Self::almanac_samples(tt, &before, &after), false),
        };

        let velocity = -(sun_after - sun_before) / (2.0 * VELOCITY_STEP_DAYS);
        (-sun, velocity, from_ephemeris)
    }

    fn almanac_samples(
        tt: &JulianInstant,
        before: &JulianInstant,
        after: &JulianInstant,
    ) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        (
            solar::sun_position(tt.centuries_since_j2000()),
            solar::sun_position(before.centuries_since_j2000()),
            solar::sun_position(after.centuries_since_j2000()),
        )
    }

    /// Topocentric position of `body` at the time its light left, equatorial J2000, AU.
    fn retarded_position(
        eph: &dyn Ephemeris,
        body: Body,
        frame: &BuiltinFrame,
    ) -> Result<Vector3<f64>, EphemerisError> {
        let geometric = eph.geocentric_position(body, &frame.tt)?;
        let light_time = (geometric - frame.observer_geocentric).norm() / VLIGHT_AU;
        let emitted = frame.tt.offset_seconds(-light_time * SECONDS_PER_DAY);
        Ok(eph.geocentric_position(body, &emitted)? - frame.observer_geocentric)
    }

    fn to_sky(
        frame: &BuiltinFrame,
        j2000: Vector3<f64>,
        distance: Option<f64>,
    ) -> Result<SkyPosition, AstrometryError> {
        let of_date = frame.precession_nutation * j2000;
        ensure_finite(&of_date, "apparent place")?;

        let (ra, dec, _) = cartesian_to_radec(of_date);
        Ok(SkyPosition {
            ra: ra.to_degrees(),
            dec: dec.to_degrees(),
            distance,
        })
    }
}

impl Astrometry for BuiltinAstrometry {
    type Entry = StarEntry;
    type Frame = BuiltinFrame;

    fn prebuild(&self, star: &Star) -> StarEntry {
        let ra = star.ra * RADEG;
        let dec = star.dec * RADEG;
        let direction = radec_to_unit(ra, dec);

        // proper motion, rad/day
        let pm_ra = star.pm_ra * RADMAS / DAYS_PER_YEAR;
        let pm_dec = star.pm_dec * RADMAS / DAYS_PER_YEAR;
        let tangential = Vector3::new(
            -pm_ra * ra.sin() - pm_dec * dec.sin() * ra.cos(),
            pm_ra * ra.cos() - pm_dec * dec.sin() * ra.sin(),
            pm_dec * dec.cos(),
        );

        let parallax = star.parallax * RADMAS;
        if parallax > 0.0 {
            let distance = 1.0 / parallax;
            StarEntry {
                position: direction * distance,
                velocity: tangential * distance
                    + direction * star.radial_velocity * KMS_TO_AU_PER_DAY,
                parallax,
            }
        } else {
            StarEntry {
                position: direction,
                velocity: tangential,
                parallax: 0.0,
            }
        }
    }

    fn make_frame(
        &self,
        observer: &Observer,
        utc: &JulianInstant,
        accuracy: Accuracy,
        eop: &EarthOrientation,
        ephemeris: Option<&dyn Ephemeris>,
    ) -> Result<BuiltinFrame, AstrometryError> {
        if ![observer.latitude, observer.longitude, observer.altitude]
            .iter()
            .all(|x| x.is_finite())
        {
            return Err(AstrometryError::NonFinite("observer"));
        }

        let tt = utc.offset_seconds(tt_minus_utc(utc));
        let ut1 = utc.offset_seconds(eop.dut1);
        let centuries = tt.centuries_since_j2000();

        let (earth_position, earth_velocity, from_ephemeris) = Self::earth_state(&tt, ephemeris);
        // an ephemeris that cannot serve this instant leaves the frame at reduced accuracy
        let accuracy = if ephemeris.is_some() && !from_ephemeris {
            Accuracy::Reduced
        } else {
            accuracy
        };

        let precession_nutation = rnut(centuries, accuracy) * prec(centuries);
        let gast = (gmst(&ut1) + equequ(centuries, accuracy)).rem_euclid(DPI);

        let (latitude, longitude) =
            polar_motion_site(observer.latitude * RADEG, observer.longitude * RADEG, eop);

        let site = Observer::new(
            latitude.to_degrees(),
            longitude.to_degrees(),
            observer.altitude,
        );
        let observer_geocentric =
            precession_nutation.transpose() * rotmt(gast, Axis::Z) * site.body_fixed_coord();

        Ok(BuiltinFrame {
            tt,
            accuracy,
            precession_nutation,
            gast,
            latitude,
            longitude,
            altitude: observer.altitude,
            observer_geocentric,
            earth_position,
            earth_velocity,
        })
    }

    fn frame_accuracy(&self, frame: &BuiltinFrame) -> Accuracy {
        frame.accuracy
    }

    fn star_position(
        &self,
        entry: &StarEntry,
        frame: &BuiltinFrame,
    ) -> Result<SkyPosition, AstrometryError> {
        let elapsed_days = frame.tt.days_since_j2000();
        let mut position = entry.position + entry.velocity * elapsed_days;

        if entry.parallax > 0.0 {
            position -= frame.earth_position + frame.observer_geocentric;
        }
        ensure_finite(&position, "star position")?;

        let direction = position
            .try_normalize(0.0)
            .ok_or(AstrometryError::NonFinite("star direction"))?;
        let apparent = annual_aberration(&direction, &frame.earth_velocity);

        Self::to_sky(frame, apparent, None)
    }

    fn body_position(
        &self,
        body: Body,
        frame: &BuiltinFrame,
        ephemeris: Option<&dyn Ephemeris>,
    ) -> Result<SkyPosition, AstrometryError> {
        let almanac_sun =
            || solar::sun_position(frame.tt.centuries_since_j2000()) - frame.observer_geocentric;

        let topocentric = match ephemeris.filter(|_| frame.accuracy == Accuracy::Full) {
            Some(eph) => match Self::retarded_position(eph, body, frame) {
                Ok(position) => position,
                Err(err) if body == Body::Sun => {
                    debug!(%err, "ephemeris Sun unavailable, using the almanac Sun");
                    almanac_sun()
                }
                Err(err) => return Err(err.into()),
            },
            None if body == Body::Sun => almanac_sun(),
            None => return Err(AstrometryError::EphemerisUnavailable(body)),
        };

        Self::to_sky(frame, topocentric, Some(topocentric.norm()))
    }

    fn to_horizontal(
        &self,
        frame: &BuiltinFrame,
        sky: &SkyPosition,
        refraction: Refraction,
    ) -> Result<HorizontalPosition, AstrometryError> {
        if !(sky.ra.is_finite() && sky.dec.is_finite()) {
            return Err(AstrometryError::NonFinite("sky position"));
        }

        let dec = sky.dec * RADEG;
        let hour_angle = frame.local_sidereal_time() - sky.ra * RADEG;

        let (sin_lat, cos_lat) = frame.latitude.sin_cos();
        let (sin_dec, cos_dec) = dec.sin_cos();
        let (sin_ha, cos_ha) = hour_angle.sin_cos();

        let elevation = (sin_lat * sin_dec + cos_lat * cos_dec * cos_ha)
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees();
        let azimuth = (-cos_dec * sin_ha)
            .atan2(sin_dec * cos_lat - cos_dec * cos_ha * sin_lat)
            .to_degrees();

        let elevation = match refraction {
            Refraction::None => elevation,
            Refraction::Standard => {
                (elevation + refraction_correction(elevation, frame.altitude)).min(90.0)
            }
        };

        Ok(HorizontalPosition {
            azimuth: normalize_degrees(azimuth),
            elevation,
        })
    }
}
