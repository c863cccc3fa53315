//! # Astronomical Snapshot
//!
//! One immutable record of every engine output for a single instant. The same
//! `d` (days since J2000.0) feeds every distance model so the values are
//! mutually consistent; calendar-based values use the instant's local date,
//! the moon phase its UTC date.
//!
//! Serialises as camelCase JSON, which is the dashboard wire format.

use crate::daylight;
use crate::drift::Probe;
use crate::events::SolarEvent;
use crate::extremum::DistanceRange;
use crate::light_time;
use crate::lunar::{self, MoonPhaseState};
use crate::orbit::{self, Planet};
use crate::speed;
use crate::time_basis::days_since_j2000;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Display ranges for the relative bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRanges {
    pub sun_au: DistanceRange,
    pub mars_au: DistanceRange,
    pub jupiter_au: DistanceRange,
    pub saturn_au: DistanceRange,
    pub moon_km: DistanceRange,
    pub daylight_hours: DistanceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstronomicalSnapshot {
    // Moon phase
    pub phase_name: String,
    pub illumination_percent: u8,
    pub phase_icon: String,
    pub ascii_art: Vec<String>,
    pub age_days: u32,
    pub days_until_full_moon: u32,
    pub phase_fraction: f64,

    // Distances
    pub sun_distance_au: f64,
    pub mars_distance_au: f64,
    pub jupiter_distance_au: f64,
    pub saturn_distance_au: f64,
    pub moon_distance_km: f64,
    pub voyager1_distance_au: f64,
    pub voyager2_distance_au: f64,
    pub new_horizons_distance_au: f64,

    pub earth_speed_km_per_sec: f64,
    pub earth_speed_km_per_hour: f64,
    pub latitude: f64,
    pub daylight_hours: f64,

    // Light travel times, preformatted
    pub light_time_sun_to_earth: String,
    pub light_time_earth_to_mars: String,
    pub light_time_earth_to_jupiter: String,
    pub light_time_earth_to_saturn: String,
    pub light_time_earth_to_voyager1: String,
    pub light_time_earth_to_voyager2: String,
    pub light_time_earth_to_new_horizons: String,

    // Countdowns
    pub days_until_vernal_equinox: i64,
    pub days_until_summer_solstice: i64,
    pub days_until_autumnal_equinox: i64,
    pub days_until_winter_solstice: i64,
    pub days_until_perihelion: i64,
    pub days_until_aphelion: i64,

    pub ranges: SnapshotRanges,

    /// Local wall-clock time of the instant, `YYYY-MM-DDTHH:MM:SS`.
    pub timestamp: String,
}

impl AstronomicalSnapshot {
    /// Evaluate every model at `instant` for an observer at `latitude_deg`.
    pub fn compute<Tz: TimeZone>(instant: &DateTime<Tz>, latitude_deg: f64) -> Self {
        let d = days_since_j2000(instant);
        let local_date = instant.date_naive();

        let sun_au = orbit::sun_distance_au(d);
        let mars_au = Planet::Mars.distance_au(d);
        let jupiter_au = Planet::Jupiter.distance_au(d);
        let saturn_au = Planet::Saturn.distance_au(d);
        let voyager1_au = Probe::Voyager1.distance_au(d);
        let voyager2_au = Probe::Voyager2.distance_au(d);
        let new_horizons_au = Probe::NewHorizons.distance_au(d);
        let speed_km_s = speed::speed_km_per_sec_at(d);
        let (day_min, day_max) = daylight::min_max_day_length(latitude_deg);

        let ranges = SnapshotRanges {
            sun_au: orbit::sun_distance_range(instant),
            mars_au: Planet::Mars.distance_range(instant),
            jupiter_au: Planet::Jupiter.distance_range(instant),
            saturn_au: Planet::Saturn.distance_range(instant),
            moon_km: lunar::distance_range(instant),
            daylight_hours: DistanceRange::new(day_min, day_max),
        };

        let moon = MoonPhaseState::from_instant(instant);

        Self {
            phase_name: moon.category_name().to_string(),
            illumination_percent: moon.illumination_percent,
            phase_icon: moon.icon().to_string(),
            ascii_art: moon.ascii().iter().map(|row| row.to_string()).collect(),
            age_days: moon.age_days,
            days_until_full_moon: moon.days_until_full_moon(),
            phase_fraction: moon.phase_fraction,

            sun_distance_au: sun_au,
            mars_distance_au: mars_au,
            jupiter_distance_au: jupiter_au,
            saturn_distance_au: saturn_au,
            moon_distance_km: lunar::distance_km(d),
            voyager1_distance_au: voyager1_au,
            voyager2_distance_au: voyager2_au,
            new_horizons_distance_au: new_horizons_au,

            earth_speed_km_per_sec: speed_km_s,
            earth_speed_km_per_hour: speed_km_s * 3600.0,
            latitude: latitude_deg,
            daylight_hours: daylight::hours_for_date(local_date, latitude_deg),

            light_time_sun_to_earth: light_time::format_for_distance(sun_au),
            light_time_earth_to_mars: light_time::format_for_distance(mars_au),
            light_time_earth_to_jupiter: light_time::format_for_distance(jupiter_au),
            light_time_earth_to_saturn: light_time::format_for_distance(saturn_au),
            light_time_earth_to_voyager1: light_time::format_for_distance(voyager1_au),
            light_time_earth_to_voyager2: light_time::format_for_distance(voyager2_au),
            light_time_earth_to_new_horizons: light_time::format_for_distance(new_horizons_au),

            days_until_vernal_equinox: SolarEvent::VernalEquinox.days_until(local_date),
            days_until_summer_solstice: SolarEvent::SummerSolstice.days_until(local_date),
            days_until_autumnal_equinox: SolarEvent::AutumnalEquinox.days_until(local_date),
            days_until_winter_solstice: SolarEvent::WinterSolstice.days_until(local_date),
            days_until_perihelion: SolarEvent::Perihelion.days_until(local_date),
            days_until_aphelion: SolarEvent::Aphelion.days_until(local_date),

            ranges,
            timestamp: instant.naive_local().format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    /// Replace every moon-phase field with `moon`, leaving the rest untouched.
    pub fn with_moon_phase(mut self, moon: MoonPhaseState) -> Self {
        self.phase_name = moon.category_name().to_string();
        self.illumination_percent = moon.illumination_percent;
        self.phase_icon = moon.icon().to_string();
        self.ascii_art = moon.ascii().iter().map(|row| row.to_string()).collect();
        self.age_days = moon.age_days;
        self.days_until_full_moon = moon.days_until_full_moon();
        self.phase_fraction = moon.phase_fraction;
        self
    }

    /// Moon phase state the snapshot currently carries.
    pub fn moon_phase(&self) -> MoonPhaseState {
        MoonPhaseState::from_fraction(self.phase_fraction)
    }
}
