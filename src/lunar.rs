//! Moon phase & low-precision lunar distance
//!
//! Phase: days elapsed since a reference new moon (2025-12-30, JDN 2 461 040),
//! folded into the mean synodic month.
//! Distance: mean Earth–Moon distance modulated by the Moon's mean anomaly.
//! Accuracy: ±1 day for the phase category; a few thousand km for distance.

use crate::extremum::{self, DistanceRange, LUNAR_WINDOW_DAYS};
use crate::time_basis::{days_since_j2000, julian_day_number, normalize_angle};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use core::f64::consts::TAU;
use serde::{Deserialize, Serialize};

/// Mean synodic month (days).
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_59;

/// Julian Day Number of the reference new moon, 2025-12-30.
pub const REFERENCE_NEW_MOON_JDN: i64 = 2_461_040;

/// Categories are centred on their canonical phase, so bins start 1/16 cycle early.
const CATEGORY_OFFSET: f64 = 0.0625;

/// The eight named lunar phases, in cycle order starting at new moon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseCategory {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl PhaseCategory {
    pub const ALL: [PhaseCategory; 8] = [
        PhaseCategory::NewMoon,
        PhaseCategory::WaxingCrescent,
        PhaseCategory::FirstQuarter,
        PhaseCategory::WaxingGibbous,
        PhaseCategory::FullMoon,
        PhaseCategory::WaningGibbous,
        PhaseCategory::LastQuarter,
        PhaseCategory::WaningCrescent,
    ];

    /// Category for a bin index; indices past 7 saturate at Waning Crescent.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(7)]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Category containing a phase fraction in `[0, 1)`.
    pub fn from_fraction(phase_fraction: f64) -> Self {
        let bin = ((phase_fraction + CATEGORY_OFFSET) * 8.0).floor();
        Self::from_index(bin.clamp(0.0, 7.0) as usize)
    }

    pub fn name(self) -> &'static str {
        match self {
            PhaseCategory::NewMoon => "New Moon",
            PhaseCategory::WaxingCrescent => "Waxing Crescent",
            PhaseCategory::FirstQuarter => "First Quarter",
            PhaseCategory::WaxingGibbous => "Waxing Gibbous",
            PhaseCategory::FullMoon => "Full Moon",
            PhaseCategory::WaningGibbous => "Waning Gibbous",
            PhaseCategory::LastQuarter => "Last Quarter",
            PhaseCategory::WaningCrescent => "Waning Crescent",
        }
    }

    /// Icon identifier uploaded to the display device.
    pub fn icon(self) -> &'static str {
        match self {
            PhaseCategory::NewMoon => "nwmoon",
            PhaseCategory::WaxingCrescent => "wancrebmoon",
            PhaseCategory::FirstQuarter => "fqmoon",
            PhaseCategory::WaxingGibbous => "wgmoon",
            PhaseCategory::FullMoon => "FullMoon",
            PhaseCategory::WaningGibbous => "wangmoon",
            PhaseCategory::LastQuarter => "lqmoon",
            PhaseCategory::WaningCrescent => "wcmoon",
        }
    }

    /// Six-row ASCII drawing of the lit portion.
    pub fn ascii(self) -> &'static [&'static str; 6] {
        &ASCII_ART[self.index()]
    }

    /// Trimmed, case-insensitive lookup of a canonical phase name.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(wanted))
    }
}

static ASCII_ART: [[&str; 6]; 8] = [
    [
        "       _..._     ",
        "     .'     `.   ",
        "    :         :  ",
        "    :         :  ",
        "    `.       .'  ",
        "      `-...-'    ",
    ],
    [
        "       _..._     ",
        "     .'   `::.   ",
        "    :       :::  ",
        "    :       :::  ",
        "    `.     .::'  ",
        "      `-..:''    ",
    ],
    [
        "       _..._     ",
        "     .'  ::::.   ",
        "    :    ::::::  ",
        "    :    ::::::  ",
        "    `.   :::::'  ",
        "      `-.::''    ",
    ],
    [
        "       _..._     ",
        "     .' .::::.   ",
        "    :  ::::::::  ",
        "    :  ::::::::  ",
        "    `. '::::::'  ",
        "      `-.::''    ",
    ],
    [
        "       _..._     ",
        "     .:::::::.   ",
        "    :::::::::::  ",
        "    :::::::::::  ",
        "    `:::::::::'  ",
        "      `':::''    ",
    ],
    [
        "       _..._     ",
        "     .::::. `.   ",
        "    :::::::.  :  ",
        "    ::::::::  :  ",
        "    `::::::' .'  ",
        "      `'::'-'    ",
    ],
    [
        "       _..._     ",
        "     .::::  `.   ",
        "    ::::::    :  ",
        "    ::::::    :  ",
        "    `:::::   .'  ",
        "      `'::.-'    ",
    ],
    [
        "       _..._     ",
        "     .::'   `.   ",
        "    :::       :  ",
        "    :::       :  ",
        "    `::.     .'  ",
        "      `':..-'    ",
    ],
];

/// Everything derived from one position in the synodic cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonPhaseState {
    /// Position in the synodic month, `[0, 1)` (0 = new, 0.5 = full).
    pub phase_fraction: f64,
    /// Age of the Moon in whole days since new.
    pub age_days: u32,
    /// Illuminated percentage of the disc (0–100).
    pub illumination_percent: u8,
    pub category: PhaseCategory,
}

/// Wrap into `[0, 1)`, correcting negative remainders.
fn wrap_unit(value: f64) -> f64 {
    let wrapped = value % 1.0;
    let wrapped = if wrapped < 0.0 { wrapped + 1.0 } else { wrapped };
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

impl MoonPhaseState {
    /// State for a phase fraction; values outside `[0, 1)` are wrapped.
    pub fn from_fraction(phase_fraction: f64) -> Self {
        let f = wrap_unit(phase_fraction);
        let illumination = (1.0 - (TAU * f).cos()) / 2.0 * 100.0;
        Self {
            phase_fraction: f,
            age_days: (f * SYNODIC_MONTH_DAYS).round() as u32,
            illumination_percent: illumination.round().clamp(0.0, 100.0) as u8,
            category: PhaseCategory::from_fraction(f),
        }
    }

    /// Phase on a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        let jdn = julian_day_number(date.day(), date.month(), date.year());
        let days_since_new_moon = (jdn - REFERENCE_NEW_MOON_JDN) as f64;
        let cycle_days = ((days_since_new_moon % SYNODIC_MONTH_DAYS) + SYNODIC_MONTH_DAYS)
            % SYNODIC_MONTH_DAYS;
        Self::from_fraction(cycle_days / SYNODIC_MONTH_DAYS)
    }

    /// Phase on the UTC calendar date of `instant`.
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self::from_date(phase_date(instant))
    }

    /// State at the centre of a named category, or `None` for an unknown name.
    pub fn from_category_name(name: &str) -> Option<Self> {
        PhaseCategory::from_name(name)
            .map(|category| Self::from_fraction(category.index() as f64 / 8.0))
    }

    pub fn category_name(&self) -> &'static str {
        self.category.name()
    }

    pub fn icon(&self) -> &'static str {
        self.category.icon()
    }

    pub fn ascii(&self) -> &'static [&'static str; 6] {
        self.category.ascii()
    }

    /// Whole days until the next full moon (0 when full).
    pub fn days_until_full_moon(&self) -> u32 {
        let remaining = ((0.5 - self.phase_fraction) + 1.0).rem_euclid(1.0);
        (remaining * SYNODIC_MONTH_DAYS).round() as u32
    }
}

// Lunar distance: mean distance minus the anomaly term
const MEAN_DISTANCE_KM: f64 = 384_400.0;
const DISTANCE_AMPLITUDE_KM: f64 = 21_000.0;
const MOON_MEAN_ANOMALY_J2000_DEG: f64 = 134.9634;
const MOON_MEAN_MOTION_DEG_PER_DAY: f64 = 13.064_992_950_9;

/// Calendar date the phase is reckoned on: the UTC date of `instant`, whatever
/// its offset.
pub fn phase_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.with_timezone(&Utc).date_naive()
}

/// Earth–Moon distance (km) at `d` days since J2000.0. Perigee at `M = 0`.
pub fn distance_km(d: f64) -> f64 {
    let m_deg = normalize_angle(MOON_MEAN_ANOMALY_J2000_DEG + MOON_MEAN_MOTION_DEG_PER_DAY * d);
    MEAN_DISTANCE_KM - DISTANCE_AMPLITUDE_KM * m_deg.to_radians().cos()
}

/// Min/max Earth–Moon distance over the next lunar window.
pub fn distance_range<Tz: TimeZone>(instant: &DateTime<Tz>) -> DistanceRange {
    extremum::sample_daily(instant, LUNAR_WINDOW_DAYS, |t| distance_km(days_since_j2000(t)))
}

/// Format kilometres with thousands separators, e.g. `"384,400 km"`.
pub fn format_distance_km(km: f64) -> String {
    format!("{} km", group_thousands(km.round() as i64))
}

pub(crate) fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
