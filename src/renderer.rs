//! # Terminal Rendering
//!
//! Text rendering of a snapshot for development mode and the service log:
//! relative bars that place a current value inside its display range, and
//! the six-row ASCII moon.

use crate::extremum::DistanceRange;
use crate::lunar;
use crate::snapshot::AstronomicalSnapshot;
use tracing::warn;

/// Inner width of the relative bars.
pub const BAR_WIDTH: usize = 30;

/// Relative bar such as `Min |-----0------------| Max`.
///
/// The marker sits at `round(position * (width - 1))`. Degenerate ranges put it
/// in the middle.
pub fn build_relative_bar(current: f64, range: &DistanceRange, inner_width: usize) -> String {
    let width = inner_width.max(1);
    if !range.min.is_finite() || !range.max.is_finite() || range.max <= range.min {
        warn!(
            min = range.min,
            max = range.max,
            "Degenerate bar range, marker centred"
        );
    }
    let marker = (range.position(current) * (width - 1) as f64).round() as usize;

    let mut bar = String::with_capacity(width + 10);
    bar.push_str("Min |");
    bar.extend((0..width).map(|i| if i == marker { '0' } else { '-' }));
    bar.push_str("| Max");
    bar
}

fn bar_block(
    lines: &mut Vec<String>,
    title: String,
    current: f64,
    range: &DistanceRange,
    fmt: impl Fn(f64) -> String,
) {
    lines.push(title);
    lines.push(build_relative_bar(current, range, BAR_WIDTH));
    lines.push(format!(
        "{}        {}        {}",
        fmt(range.min),
        fmt(current),
        fmt(range.max)
    ));
}

/// Human-readable report of a snapshot, one entry per output line.
pub fn render_lines(snapshot: &AstronomicalSnapshot) -> Vec<String> {
    let s = snapshot;
    let r = &s.ranges;
    let au = |v: f64| format!("{:.6}", v);
    let mut lines = Vec::with_capacity(48);

    lines.push(format!("Snapshot at {}", s.timestamp));

    bar_block(
        &mut lines,
        format!("Earth-Sun distance: {:.6} AU", s.sun_distance_au),
        s.sun_distance_au,
        &r.sun_au,
        au,
    );
    bar_block(
        &mut lines,
        format!("Earth-Mars distance: {:.6} AU", s.mars_distance_au),
        s.mars_distance_au,
        &r.mars_au,
        au,
    );
    bar_block(
        &mut lines,
        format!("Earth-Jupiter distance: {:.6} AU", s.jupiter_distance_au),
        s.jupiter_distance_au,
        &r.jupiter_au,
        au,
    );
    bar_block(
        &mut lines,
        format!("Earth-Saturn distance: {:.6} AU", s.saturn_distance_au),
        s.saturn_distance_au,
        &r.saturn_au,
        au,
    );
    bar_block(
        &mut lines,
        format!("Moon distance: {}", lunar::format_distance_km(s.moon_distance_km)),
        s.moon_distance_km,
        &r.moon_km,
        lunar::format_distance_km,
    );
    bar_block(
        &mut lines,
        format!("Daylight length at latitude {}: {:.2} h", s.latitude, s.daylight_hours),
        s.daylight_hours,
        &r.daylight_hours,
        |v| format!("{:.2}", v),
    );

    lines.push(format!("Voyager 1 distance from Earth: {:.6} AU", s.voyager1_distance_au));
    lines.push(format!("Voyager 2 distance from Earth: {:.6} AU", s.voyager2_distance_au));
    lines.push(format!("New Horizons distance from Earth: {:.6} AU", s.new_horizons_distance_au));
    lines.push(format!(
        "Earth's orbital speed: {:.2} km/s ({} km/h)",
        s.earth_speed_km_per_sec,
        lunar::group_thousands(s.earth_speed_km_per_hour.round() as i64)
    ));

    lines.push("--- Light Travel Times ---".to_string());
    lines.push(format!("Sun -> Earth:          {}", s.light_time_sun_to_earth));
    lines.push(format!("Earth -> Mars:         {}", s.light_time_earth_to_mars));
    lines.push(format!("Earth -> Jupiter:      {}", s.light_time_earth_to_jupiter));
    lines.push(format!("Earth -> Saturn:       {}", s.light_time_earth_to_saturn));
    lines.push(format!("Earth -> Voyager 1:    {}", s.light_time_earth_to_voyager1));
    lines.push(format!("Earth -> Voyager 2:    {}", s.light_time_earth_to_voyager2));
    lines.push(format!("Earth -> New Horizons: {}", s.light_time_earth_to_new_horizons));

    lines.push("--- Countdowns ---".to_string());
    lines.push(format!("Vernal equinox:   {}d", s.days_until_vernal_equinox));
    lines.push(format!("Summer solstice:  {}d", s.days_until_summer_solstice));
    lines.push(format!("Autumnal equinox: {}d", s.days_until_autumnal_equinox));
    lines.push(format!("Winter solstice:  {}d", s.days_until_winter_solstice));
    lines.push(format!("Perihelion:       {}d", s.days_until_perihelion));
    lines.push(format!("Aphelion:         {}d", s.days_until_aphelion));

    lines.push(format!(
        "Moon phase: {} ({} days, {}% illuminated)",
        s.phase_name, s.age_days, s.illumination_percent
    ));
    lines.extend(s.ascii_art.iter().cloned());
    lines.push(format!("Days until next full moon: {}", s.days_until_full_moon));

    lines
}

/// Print the report to stdout (development mode).
pub fn draw_ascii(snapshot: &AstronomicalSnapshot) {
    for line in render_lines(snapshot) {
        println!("{}", line);
    }
}
