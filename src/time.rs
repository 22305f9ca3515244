//! # Julian Day time system
//!
//! Continuous day count anchored at **JD 0 = 4714 BCE November 24, 12:00:00 UTC**
//! (proleptic Gregorian year −4713), split into an integer day number and a
//! fraction of day in `[0, 1)`.
//!
//! The split form keeps sub-microsecond resolution over the whole Julian range: a single
//! `f64` Julian Day near the present only resolves ~40 µs, while the fraction alone
//! resolves ~10⁻¹¹ s.
//!
//! ## Conversions
//!
//! - [`to_julian`] – calendar instant ([`chrono::DateTime<Utc>`]) → [`JulianInstant`]
//! - [`to_calendar`] – [`JulianInstant`] → calendar instant
//!
//! Both are total over chrono's supported range and round-trip within one microsecond.
//!
//! ## Earth rotation helpers
//!
//! - [`tt_minus_utc`] – leap-second aware TT − UTC offset (from [`hifitime`])
//! - [`gmst`] – Greenwich Mean Sidereal Time (IAU 1982) evaluated on the split form
use std::time::SystemTime;

use chrono::{DateTime, TimeDelta, Utc};
use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::constants::{
    Radian, DAYS_PER_CENTURY, DPI, J2000_JD, MICROS_PER_DAY, MICROS_PER_SECOND, MJD_DAY_OFFSET,
    SECONDS_PER_DAY, SIDEREAL_RATE, T2000, UNIX_EPOCH_JD_MICROS,
};

/// A Julian Day broken into its integer and fractional parts.
///
/// Invariant: `0.0 <= fraction < 1.0`. Instants before the epoch borrow one day
/// instead of carrying a negative fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JulianInstant {
    day_number: i64,
    fraction: f64,
}

impl JulianInstant {
    /// Build from a microsecond count since JD 0.
    pub(crate) fn from_micros(jd_micros: i64) -> Self {
        JulianInstant {
            day_number: jd_micros.div_euclid(MICROS_PER_DAY),
            fraction: jd_micros.rem_euclid(MICROS_PER_DAY) as f64 / MICROS_PER_DAY as f64,
        }
    }

    /// Build from a day number and an arbitrary (possibly out of range) fraction.
    pub(crate) fn from_parts(day_number: i64, fraction: f64) -> Self {
        let carry = fraction.floor();
        let mut day_number = day_number + carry as i64;
        let mut fraction = fraction - carry;
        // `x - x.floor()` can round up to exactly 1.0 for tiny negative inputs
        if fraction >= 1.0 {
            fraction -= 1.0;
            day_number += 1;
        }
        JulianInstant {
            day_number,
            fraction,
        }
    }

    /// The current instant.
    pub fn now() -> Self {
        to_julian(&Utc::now())
    }

    pub fn day_number(&self) -> i64 {
        self.day_number
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Julian Day as a single float. Loses precision (tens of µs); use only for
    /// inputs of low-precision series.
    pub fn to_jd(&self) -> f64 {
        self.day_number as f64 + self.fraction
    }

    /// Shift the instant by a number of SI seconds.
    pub fn offset_seconds(&self, seconds: f64) -> Self {
        JulianInstant::from_parts(self.day_number, self.fraction + seconds / SECONDS_PER_DAY)
    }

    /// Days elapsed since J2000.0, keeping the integer part exact.
    pub fn days_since_j2000(&self) -> f64 {
        (self.day_number - J2000_JD) as f64 + self.fraction
    }

    /// Julian centuries elapsed since J2000.0.
    pub fn centuries_since_j2000(&self) -> f64 {
        self.days_since_j2000() / DAYS_PER_CENTURY
    }
}

impl From<DateTime<Utc>> for JulianInstant {
    fn from(instant: DateTime<Utc>) -> Self {
        to_julian(&instant)
    }
}

impl From<SystemTime> for JulianInstant {
    fn from(instant: SystemTime) -> Self {
        to_julian(&DateTime::<Utc>::from(instant))
    }
}

/// The calendar instant of JD 0: 4714 BCE November 24, 12:00:00 UTC.
pub fn julian_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH - TimeDelta::microseconds(UNIX_EPOCH_JD_MICROS)
}

/// Round a signed duration to the nearest microsecond.
///
/// Nanosecond counts from the Julian epoch do not fit in an `i64` past ~292 years, so
/// the elapsed time is reduced to whole seconds plus rounded sub-second microseconds
/// without ever materializing the nanosecond total.
fn round_to_micros(elapsed: TimeDelta) -> i64 {
    let seconds = elapsed.num_seconds();
    let nanos = i64::from(elapsed.subsec_nanos());
    seconds
        .saturating_mul(MICROS_PER_SECOND)
        .saturating_add((nanos + 500).div_euclid(1_000))
}

/// Convert a calendar instant to its split Julian Day representation.
///
/// Arguments
/// ---------
/// * `instant`: UTC calendar instant, any sub-second resolution.
///
/// Return
/// ------
/// * The [`JulianInstant`] with `fraction ∈ [0, 1)`; precision loss is bounded by 0.5 µs.
pub fn to_julian(instant: &DateTime<Utc>) -> JulianInstant {
    let elapsed = instant.signed_duration_since(julian_epoch());
    JulianInstant::from_micros(round_to_micros(elapsed))
}

/// Convert a split Julian Day back to a calendar instant.
///
/// Saturates at chrono's representable range.
pub fn to_calendar(jd: &JulianInstant) -> DateTime<Utc> {
    let fraction_micros = (jd.fraction * MICROS_PER_DAY as f64).round() as i64;
    let offset = jd
        .day_number
        .saturating_mul(MICROS_PER_DAY)
        .saturating_add(fraction_micros);

    julian_epoch()
        .checked_add_signed(TimeDelta::microseconds(offset))
        .unwrap_or(if offset < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

/// TT − UTC in seconds at the given UTC instant (leap seconds + 32.184 s).
pub fn tt_minus_utc(utc: &JulianInstant) -> f64 {
    let epoch = Epoch::from_jde_utc(utc.to_jd());
    (epoch.to_mjd_tt_days() - epoch.to_mjd_utc_days()) * SECONDS_PER_DAY
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians for a UT1 instant.
///
/// The IAU 1982 cubic gives GMST at 0h UT1; the elapsed fraction of the civil day is then
/// scaled by the sidereal rate. Julian days begin at noon, so the instant is shifted by half a
/// day to land on civil-day boundaries before splitting.
///
/// # Arguments
/// * `ut1` - instant in the UT1 time scale
///
/// # Returns
/// * GMST angle in radians, normalized to `[0, 2π)`.
pub fn gmst(ut1: &JulianInstant) -> Radian {
    // Polynomial coefficients for GMST at 0h UT1 (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    let civil = ut1.offset_seconds(SECONDS_PER_DAY / 2.0);
    let mjd0 = (civil.day_number - MJD_DAY_OFFSET) as f64;
    let t = (mjd0 - T2000) / DAYS_PER_CENTURY;

    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / SECONDS_PER_DAY;
    let gmst = gmst0 + civil.fraction * DPI * SIDEREAL_RATE;

    gmst.rem_euclid(DPI)
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_epoch_is_day_zero() {
        let jd = to_julian(&julian_epoch());
        assert_eq!(jd.day_number(), 0);
        assert_eq!(jd.fraction(), 0.0);
    }

    #[test]
    fn test_epoch_calendar_date() {
        let epoch = to_calendar(&JulianInstant::from_parts(0, 0.0));
        assert_eq!(epoch.year(), -4713);
        assert_eq!(epoch.month(), 11);
        assert_eq!(epoch.day(), 24);
        assert_eq!(epoch.hour(), 12);
        assert_eq!(epoch.minute(), 0);
        assert_eq!(epoch.second(), 0);
        assert_eq!(epoch.nanosecond(), 0);
    }

    #[test]
    fn test_unix_epoch() {
        let jd = to_julian(&DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(jd.day_number(), 2_440_587);
        assert_eq!(jd.fraction(), 0.5);
    }

    #[test]
    fn test_j2000() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let jd = to_julian(&j2000);
        assert_eq!(jd.day_number(), J2000_JD);
        assert_eq!(jd.fraction(), 0.0);
        assert_eq!(jd.days_since_j2000(), 0.0);
    }

    #[test]
    fn test_before_epoch_borrows_a_day() {
        let before = julian_epoch() - TimeDelta::hours(6);
        let jd = to_julian(&before);
        assert_eq!(jd.day_number(), -1);
        assert_eq!(jd.fraction(), 0.75);
    }

    #[test]
    fn test_nanoseconds_round_to_microseconds() {
        let base = Utc.with_ymd_and_hms(2024, 6, 21, 8, 47, 0).unwrap();
        let up = to_julian(&(base + TimeDelta::nanoseconds(1_500)));
        let down = to_julian(&(base + TimeDelta::nanoseconds(1_499)));

        assert_eq!(to_calendar(&up), base + TimeDelta::microseconds(2));
        assert_eq!(to_calendar(&down), base + TimeDelta::microseconds(1));
    }

    #[test]
    fn test_round_trip_now() {
        let now = Utc::now();
        let back = to_calendar(&to_julian(&now));
        let diff = (now - back).num_nanoseconds().unwrap().abs();
        assert!(diff <= 1_000, "round trip drift {diff} ns");
    }

    #[test]
    fn test_from_parts_normalizes() {
        let jd = JulianInstant::from_parts(10, -0.25);
        assert_eq!(jd.day_number(), 9);
        assert_eq!(jd.fraction(), 0.75);

        let jd = JulianInstant::from_parts(10, 2.5);
        assert_eq!(jd.day_number(), 12);
        assert_eq!(jd.fraction(), 0.5);

        let jd = JulianInstant::from_parts(10, -1e-18);
        assert!(jd.fraction() < 1.0);
    }

    #[test]
    fn test_offset_seconds() {
        let jd = JulianInstant::from_parts(J2000_JD, 0.0).offset_seconds(-43_200.0);
        assert_eq!(jd.day_number(), J2000_JD - 1);
        assert_eq!(jd.fraction(), 0.5);
    }

    #[test]
    fn test_tt_minus_utc() {
        let utc = to_julian(&Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_relative_eq!(tt_minus_utc(&utc), 69.184, epsilon = 1e-3);
    }

    #[test]
    fn test_gmst() {
        // MJD 57028.478514610404 (UT1)
        let tut = JulianInstant::from_parts(2_457_028, 0.978514610404);
        assert_relative_eq!(gmst(&tut), 4.851925725092499, epsilon = 1e-8);

        let tut = JulianInstant::from_parts(J2000_JD, 0.0);
        assert_relative_eq!(gmst(&tut), 4.894961212789145, epsilon = 1e-10);
    }
}
