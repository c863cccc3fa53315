//! Light travel time over a distance in AU.

use crate::drift::KM_PER_AU;

/// Speed of light in vacuum (km/s).
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Seconds for light to cross `distance_au`.
pub fn seconds_for_distance(distance_au: f64) -> f64 {
    distance_au * KM_PER_AU / SPEED_OF_LIGHT_KM_S
}

/// Compact duration: `"42s"`, `"8m 19s"` or `"22h 58m"`. Sub-minute values round to
/// the nearest second; minutes and hours truncate.
pub fn format_seconds(total_seconds: f64) -> String {
    if total_seconds < 60.0 {
        return format!("{}s", total_seconds.max(0.0).round() as u64);
    }

    let total_minutes = (total_seconds / 60.0) as u64;
    if total_minutes < 60 {
        let secs = (total_seconds % 60.0) as u64;
        return format!("{}m {}s", total_minutes, secs);
    }

    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// Formatted light travel time for a distance in AU.
pub fn format_for_distance(distance_au: f64) -> String {
    format_seconds(seconds_for_distance(distance_au))
}
