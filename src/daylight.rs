//! Day length from an approximate solar declination.
//!
//! `decl = 23.44° · sin(2π · (284 + day_of_year) / days_in_year)` and the
//! sunrise hour angle `acos(−tan φ · tan δ)`. Refraction and the solar disc
//! radius are ignored, so equinox day length is exactly 12 h everywhere.

use crate::extremum::days_in_year;
use chrono::{Datelike, NaiveDate};
use core::f64::consts::{PI, TAU};

/// Earth's axial tilt (deg).
pub const AXIAL_TILT_DEG: f64 = 23.44;

/// Latitudes at or beyond this see polar day and polar night every year.
pub const POLAR_CIRCLE_DEG: f64 = 66.5;

/// Solar declination (deg) on a calendar date.
pub fn solar_declination_deg(date: NaiveDate) -> f64 {
    let n = f64::from(date.ordinal());
    let year_len = f64::from(days_in_year(date.year()));
    AXIAL_TILT_DEG * (TAU * (284.0 + n) / year_len).sin()
}

fn hours_from_declination(latitude_deg: f64, declination_deg: f64) -> f64 {
    let x = -latitude_deg.to_radians().tan() * declination_deg.to_radians().tan();
    if x >= 1.0 {
        0.0 // polar night
    } else if x <= -1.0 {
        24.0 // polar day
    } else {
        (24.0 / PI) * x.acos()
    }
}

/// Hours of daylight on `date` at `latitude_deg` (expected in `[-90, 90]`).
pub fn hours_for_date(date: NaiveDate, latitude_deg: f64) -> f64 {
    hours_from_declination(latitude_deg, solar_declination_deg(date))
}

/// Shortest and longest day of the year at `latitude_deg`, as `(min, max)`.
pub fn min_max_day_length(latitude_deg: f64) -> (f64, f64) {
    if latitude_deg.abs() >= POLAR_CIRCLE_DEG {
        return (0.0, 24.0);
    }

    let summer = hours_from_declination(latitude_deg, AXIAL_TILT_DEG);
    let winter = hours_from_declination(latitude_deg, -AXIAL_TILT_DEG);
    (summer.min(winter), summer.max(winter))
}
