//! # Constants and type definitions for Zenith
//!
//! This module centralizes the **physical constants**, **time-scale constants**,
//! **Earth orientation defaults**, and the **unit type aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Angular and temporal conversion factors
//! - Julian Day anchors (J2000.0, Unix epoch) expressed in the split day/microsecond form
//! - Earth ellipsoid and light-time constants
//! - Default Earth orientation parameters (ΔUT1, polar motion)
//!
//! Angles exchanged through the public API are in **degrees**; the numerical core works in
//! **radians** and converts at the boundary.

// -------------------------------------------------------------------------------------------------
// Angular conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Milliarcseconds → radians
pub const RADMAS: f64 = RADSEC / 1000.0;

// -------------------------------------------------------------------------------------------------
// Time
// -------------------------------------------------------------------------------------------------

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of microseconds in one second
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Number of microseconds in a Julian day
pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// Days in a Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Days in a Julian year
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Julian Day of J2000.0 (2000-01-01 12:00:00 TT)
pub const J2000_JD: i64 = 2_451_545;

/// Julian Day of the Unix epoch (1970-01-01 00:00:00 UTC) is 2440587.5;
/// this is the same instant counted in microseconds from JD 0.
pub const UNIX_EPOCH_JD_MICROS: i64 = 2_440_587 * MICROS_PER_DAY + MICROS_PER_DAY / 2;

/// Offset between the Julian Day number and the Modified Julian Day number
/// once the half-day shift has been applied (MJD = JD − 2400000.5).
pub const MJD_DAY_OFFSET: i64 = 2_400_001;

/// MJD epoch of J2000.0
pub const T2000: f64 = 51544.5;

// -------------------------------------------------------------------------------------------------
// Geodesy and physics
// -------------------------------------------------------------------------------------------------

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Earth equatorial radius in meters (GRS1980/WGS84)
pub const EARTH_MAJOR_AXIS: f64 = 6_378_137.0;

/// Earth polar radius in meters (GRS1980/WGS84)
pub const EARTH_MINOR_AXIS: f64 = 6_356_752.3;

/// Earth radius expressed in astronomical units
pub const ERAU: f64 = (EARTH_MAJOR_AXIS / 1000.) / AU;

/// Speed of light in km/s
pub const VLIGHT: f64 = 2.99792458e5;

/// Speed of light in astronomical units per day
pub const VLIGHT_AU: f64 = VLIGHT / AU * SECONDS_PER_DAY;

/// One km/s expressed in AU per day
pub const KMS_TO_AU_PER_DAY: f64 = SECONDS_PER_DAY / AU;

/// Ratio of the sidereal to the solar day rate
pub const SIDEREAL_RATE: f64 = 1.00273790934;

// -------------------------------------------------------------------------------------------------
// Earth orientation defaults (IERS Bulletin A order of magnitude)
// -------------------------------------------------------------------------------------------------

/// Default UT1 − UTC in seconds.
///
/// This value drifts daily; it is only a default for [`crate::astrometry::EarthOrientation`].
pub const DEFAULT_DUT1: f64 = 0.1;

/// Default polar motion x offset in milliarcseconds.
pub const DEFAULT_POLAR_X: f64 = 104.89;

/// Default polar motion y offset in milliarcseconds.
pub const DEFAULT_POLAR_Y: f64 = 387.83;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in milliarcseconds
pub type MilliArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in meters
pub type Meter = f64;
/// Distance in astronomical units
pub type Au = f64;
