//! # Seasonal Event Countdowns
//!
//! Equinoxes, solstices, perihelion and aphelion pinned to fixed calendar dates.
//! Real event dates drift by a day or two across the leap-year cycle; the
//! countdown is for display and does not model that drift.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolarEvent {
    VernalEquinox,
    SummerSolstice,
    AutumnalEquinox,
    WinterSolstice,
    Perihelion,
    Aphelion,
}

impl SolarEvent {
    pub const ALL: [SolarEvent; 6] = [
        SolarEvent::VernalEquinox,
        SolarEvent::SummerSolstice,
        SolarEvent::AutumnalEquinox,
        SolarEvent::WinterSolstice,
        SolarEvent::Perihelion,
        SolarEvent::Aphelion,
    ];

    /// Fixed (month, day) of the event.
    pub fn month_day(self) -> (u32, u32) {
        match self {
            SolarEvent::VernalEquinox => (3, 20),
            SolarEvent::SummerSolstice => (6, 21),
            SolarEvent::AutumnalEquinox => (9, 22),
            SolarEvent::WinterSolstice => (12, 21),
            SolarEvent::Perihelion => (1, 3),
            SolarEvent::Aphelion => (7, 4),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SolarEvent::VernalEquinox => "vernal equinox",
            SolarEvent::SummerSolstice => "summer solstice",
            SolarEvent::AutumnalEquinox => "autumnal equinox",
            SolarEvent::WinterSolstice => "winter solstice",
            SolarEvent::Perihelion => "perihelion",
            SolarEvent::Aphelion => "aphelion",
        }
    }

    fn in_year(self, year: i32) -> NaiveDate {
        let (month, day) = self.month_day();
        // None of the fixed dates is Feb 29, so every year has them
        NaiveDate::from_ymd_opt(year, month, day).expect("fixed event date exists in every year")
    }

    /// First occurrence strictly after `from`; an event falling on `from`
    /// itself rolls over to next year.
    pub fn next_occurrence(self, from: NaiveDate) -> NaiveDate {
        let candidate = self.in_year(from.year());
        if from < candidate {
            candidate
        } else {
            self.in_year(from.year() + 1)
        }
    }

    /// Whole days from `from` until the next occurrence (1..=366).
    pub fn days_until(self, from: NaiveDate) -> i64 {
        (self.next_occurrence(from) - from).num_days()
    }
}
