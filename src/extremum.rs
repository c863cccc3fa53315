//! Daily min/max sampling for display ranges.
//!
//! Earth-relative distances are the difference of two independently phased
//! periodic signals, so their extrema over a window are found by evaluating the
//! distance once per day rather than solved in closed form.

use chrono::{DateTime, Days, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Sampling window used for the Moon (covers one ~27.3 day anomalistic month).
pub const LUNAR_WINDOW_DAYS: u32 = 30;

/// Closed `[min, max]` interval of sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceRange {
    pub min: f64,
    pub max: f64,
}

impl DistanceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Relative position of `value` within the range, clamped to `[0, 1]`.
    ///
    /// Inverted, zero-width or non-finite ranges have no meaningful scale and
    /// report the midpoint.
    pub fn position(&self, value: f64) -> f64 {
        if !self.min.is_finite() || !self.max.is_finite() || self.max <= self.min {
            return 0.5;
        }
        let frac = (value - self.min) / (self.max - self.min);
        if frac.is_nan() {
            0.5
        } else {
            frac.clamp(0.0, 1.0)
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Number of days in a proleptic Gregorian year.
pub fn days_in_year(year: i32) -> u32 {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    if leap {
        366
    } else {
        365
    }
}

/// Evaluate `f` once per day for `days` days, starting at local midnight of
/// `reference`, and return the extremes.
///
/// A zero-day window is sampled as a single day. When local midnight does not
/// exist (a DST gap), sampling starts at `reference` itself.
pub fn sample_daily<Tz, F>(reference: &DateTime<Tz>, days: u32, mut f: F) -> DistanceRange
where
    Tz: TimeZone,
    F: FnMut(&DateTime<Tz>) -> f64,
{
    let start = reference
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_local_timezone(reference.timezone())
        .earliest()
        .unwrap_or_else(|| reference.clone());

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for offset in 0..days.max(1) {
        let Some(t) = start.clone().checked_add_days(Days::new(u64::from(offset))) else {
            break;
        };
        let value = f(&t);
        min = min.min(value);
        max = max.max(value);
    }

    DistanceRange { min, max }
}
