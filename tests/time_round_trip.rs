use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use zenith::time::{julian_epoch, to_calendar, to_julian};

// 1600-01-01 .. 2400-01-01
const MIN_MICROS: i64 = -11_676_096_000_000_000;
const MAX_MICROS: i64 = 13_569_465_600_000_000;

fn instant(micros: i64) -> DateTime<Utc> {
    Utc.timestamp_micros(micros).unwrap()
}

proptest! {
    #[test]
    fn calendar_round_trip_within_a_microsecond(micros in MIN_MICROS..MAX_MICROS) {
        let t = instant(micros);
        let back = to_calendar(&to_julian(&t));
        let error = (back - t).num_microseconds().unwrap().abs();
        prop_assert!(error <= 1, "{t} came back as {back}");
    }

    #[test]
    fn fraction_stays_in_unit_interval(micros in MIN_MICROS..MAX_MICROS) {
        let jd = to_julian(&instant(micros));
        prop_assert!((0.0..1.0).contains(&jd.fraction()));
    }

    #[test]
    fn day_number_is_monotonic(a in MIN_MICROS..MAX_MICROS, b in MIN_MICROS..MAX_MICROS) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let jd_lo = to_julian(&instant(lo));
        let jd_hi = to_julian(&instant(hi));
        prop_assert!(
            jd_lo.day_number() < jd_hi.day_number()
                || (jd_lo.day_number() == jd_hi.day_number() && jd_lo.fraction() <= jd_hi.fraction())
        );
    }
}

#[test]
fn julian_epoch_is_day_zero() {
    let jd = to_julian(&julian_epoch());
    assert_eq!(jd.day_number(), 0);
    assert_eq!(jd.fraction(), 0.0);
}
