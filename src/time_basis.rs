//! # Calendar and Epoch Primitives
//!
//! Every model in the engine is driven by one of two day counts:
//!
//! - **Days since J2000.0** (`d`): a real number, zero at 2000-01-01 12:00 UTC.
//!   Keplerian bodies, deep-space probes and the lunar distance model all read
//!   the same `d` for a given instant, so their relative geometry stays consistent.
//! - **Julian Day Number**: an integer day index used by the lunar phase model.
//!
//! Both use the Fliegel–Van Flandern integer algorithm with the Gregorian reform
//! cutoff at 1582-10-15 (inclusive). Days start at noon, as is conventional for JDN.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00).
pub const J2000_JD: f64 = 2_451_545.0;

/// Seconds in a civil day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_angle(deg: f64) -> f64 {
    ((deg % 360.0) + 360.0) % 360.0
}

/// True when the calendar date falls on or after the Gregorian reform (1582-10-15).
fn is_gregorian(day: i64, month: i64, year: i64) -> bool {
    year > 1582 || (year == 1582 && (month > 10 || (month == 10 && day >= 15)))
}

/// Julian Day Number of a calendar date.
///
/// ```
/// use moon_clock_lib::time_basis::julian_day_number;
///
/// assert_eq!(julian_day_number(1, 1, 2000), 2_451_545);
/// ```
pub fn julian_day_number(day: u32, month: u32, year: i32) -> i64 {
    let (day, month, year) = (i64::from(day), i64::from(month), i64::from(year));

    let a = (14 - month).div_euclid(12);
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    let month_days = (153 * m + 2).div_euclid(5);

    if is_gregorian(day, month, year) {
        day + month_days + 365 * y + y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400)
            - 32045
    } else {
        day + month_days + 365 * y + y.div_euclid(4) - 32083
    }
}

/// Days since J2000.0 for an instant in any time zone.
///
/// The instant is normalised to UTC first so that every body sees the same
/// day count regardless of the caller's zone.
pub fn days_since_j2000<Tz: TimeZone>(instant: &DateTime<Tz>) -> f64 {
    let utc = instant.with_timezone(&Utc);
    let jdn = julian_day_number(utc.day(), utc.month(), utc.year());

    let frac_day = (f64::from(utc.hour()) - 12.0) / 24.0
        + f64::from(utc.minute()) / 1440.0
        + f64::from(utc.second()) / SECONDS_PER_DAY;

    jdn as f64 + frac_day - J2000_JD
}
