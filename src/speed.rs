//! Earth's orbital speed from the vis-viva equation.
//!
//! `v = sqrt(GM☉ · (2/r − 1/a))` with `r` from the two-term Sun–Earth distance.
//! Ranges from ~29.3 km/s at aphelion to ~30.3 km/s at perihelion.

use crate::drift::KM_PER_AU;
use crate::orbit::sun_distance_au;
use crate::time_basis::days_since_j2000;
use chrono::{DateTime, TimeZone};

/// Standard gravitational parameter of the Sun (km³/s²).
pub const GM_SUN_KM3_S2: f64 = 1.327_124_400_18e11;

/// Earth's semi-major axis (km).
pub const EARTH_SEMI_MAJOR_AXIS_KM: f64 = KM_PER_AU;

/// Orbital speed (km/s) at a heliocentric radius in AU.
pub fn vis_viva_km_s(radius_au: f64) -> f64 {
    let r_km = radius_au * KM_PER_AU;
    (GM_SUN_KM3_S2 * (2.0 / r_km - 1.0 / EARTH_SEMI_MAJOR_AXIS_KM)).sqrt()
}

/// Earth's orbital speed (km/s) at `d` days since J2000.0.
pub fn speed_km_per_sec_at(d: f64) -> f64 {
    vis_viva_km_s(sun_distance_au(d))
}

pub fn speed_km_per_sec<Tz: TimeZone>(instant: &DateTime<Tz>) -> f64 {
    speed_km_per_sec_at(days_since_j2000(instant))
}

pub fn speed_km_per_hour<Tz: TimeZone>(instant: &DateTime<Tz>) -> f64 {
    speed_km_per_sec(instant) * 3600.0
}
