//! # First-Order Keplerian Orbits
//!
//! Heliocentric radius and ecliptic longitude from mean orbital elements, and
//! Earth-relative distances for the outer planets.
//!
//! ## Model
//! - Mean anomaly: `M = normalize(M0 + n·d)`
//! - Radius (one-term): `r = a·(1 − e·cos M)`
//! - Longitude: `L = M + ϖ`
//! - Earth–body distance: planar law of cosines between the two heliocentric positions
//!
//! Earth's own radius uses a two-term series instead of the one-term radius:
//! `r = 1.00014 − 0.01671·cos M − 0.00014·cos 2M`. Every geocentric distance
//! is built on Earth's radius, so the extra term is kept.
//!
//! ## Accuracy
//! - ✅ Sun–Earth distance within a few 1e-4 AU
//! - ✅ Planet distances good to a few percent, enough for a display bar
//! - ❌ No inclination, perturbations or equation of centre

use crate::extremum::{self, DistanceRange};
use crate::time_basis::{days_since_j2000, normalize_angle};
use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};

/// Mean orbital elements referred to J2000.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// Semi-major axis (AU)
    pub semi_major_axis_au: f64,
    /// Eccentricity
    pub eccentricity: f64,
    /// Mean anomaly at J2000.0 (deg)
    pub mean_anomaly_deg: f64,
    /// Mean motion (deg/day)
    pub mean_motion_deg_per_day: f64,
    /// Longitude of perihelion (deg)
    pub perihelion_longitude_deg: f64,
}

pub const EARTH: OrbitalElements = OrbitalElements {
    semi_major_axis_au: 1.0,
    eccentricity: 0.01671,
    mean_anomaly_deg: 357.529,
    mean_motion_deg_per_day: 0.985_600_28,
    perihelion_longitude_deg: 102.937_35,
};

pub const MARS: OrbitalElements = OrbitalElements {
    semi_major_axis_au: 1.523_679,
    eccentricity: 0.0934,
    mean_anomaly_deg: 19.3870,
    mean_motion_deg_per_day: 0.524_020_776_6,
    perihelion_longitude_deg: 336.040_84,
};

pub const JUPITER: OrbitalElements = OrbitalElements {
    semi_major_axis_au: 5.2026,
    eccentricity: 0.0489,
    mean_anomaly_deg: 20.0202,
    mean_motion_deg_per_day: 0.083_129_4,
    perihelion_longitude_deg: 14.753_85,
};

pub const SATURN: OrbitalElements = OrbitalElements {
    semi_major_axis_au: 9.5549,
    eccentricity: 0.0557,
    mean_anomaly_deg: 317.0207,
    mean_motion_deg_per_day: 0.033_444_2,
    perihelion_longitude_deg: 92.431_94,
};

// Two-term Earth radius series
const EARTH_ORBIT_MEAN_AU: f64 = 1.00014;
const EARTH_ORBIT_CORRECTION: f64 = 0.00014;

/// Heliocentric position in the ecliptic plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeliocentricPosition {
    pub radius_au: f64,
    pub longitude_deg: f64,
}

impl OrbitalElements {
    /// Mean anomaly in degrees, wrapped into `[0, 360)`.
    pub fn mean_anomaly_at(&self, d: f64) -> f64 {
        normalize_angle(self.mean_anomaly_deg + self.mean_motion_deg_per_day * d)
    }

    /// One-term heliocentric position.
    pub fn heliocentric(&self, d: f64) -> HeliocentricPosition {
        let m_deg = self.mean_anomaly_at(d);
        let radius_au =
            self.semi_major_axis_au * (1.0 - self.eccentricity * m_deg.to_radians().cos());
        HeliocentricPosition {
            radius_au,
            longitude_deg: m_deg + self.perihelion_longitude_deg,
        }
    }
}

/// Earth's heliocentric position using the two-term radius series.
pub fn earth_heliocentric(d: f64) -> HeliocentricPosition {
    let m_deg = EARTH.mean_anomaly_at(d);
    let m = m_deg.to_radians();
    let radius_au = EARTH_ORBIT_MEAN_AU
        - EARTH.eccentricity * m.cos()
        - EARTH_ORBIT_CORRECTION * (2.0 * m).cos();
    HeliocentricPosition {
        radius_au,
        longitude_deg: m_deg + EARTH.perihelion_longitude_deg,
    }
}

/// Sun–Earth distance (AU) at `d` days since J2000.0.
pub fn sun_distance_au(d: f64) -> f64 {
    earth_heliocentric(d).radius_au
}

/// Earth–body distance (AU) by the law of cosines in the ecliptic plane.
pub fn geocentric_distance_au(body: &OrbitalElements, d: f64) -> f64 {
    let earth = earth_heliocentric(d);
    let other = body.heliocentric(d);

    let delta = (other.longitude_deg.to_radians() - earth.longitude_deg.to_radians()).abs();
    (earth.radius_au.powi(2) + other.radius_au.powi(2)
        - 2.0 * earth.radius_au * other.radius_au * delta.cos())
    .sqrt()
}

/// Planets tracked by the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Planet {
    Mars,
    Jupiter,
    Saturn,
}

impl Planet {
    pub const ALL: [Planet; 3] = [Planet::Mars, Planet::Jupiter, Planet::Saturn];

    pub fn elements(self) -> &'static OrbitalElements {
        match self {
            Planet::Mars => &MARS,
            Planet::Jupiter => &JUPITER,
            Planet::Saturn => &SATURN,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
        }
    }

    /// Earth–planet distance (AU) at `d` days since J2000.0.
    pub fn distance_au(self, d: f64) -> f64 {
        geocentric_distance_au(self.elements(), d)
    }

    /// Min/max Earth–planet distance over the year starting at `instant`'s local midnight.
    pub fn distance_range<Tz: TimeZone>(self, instant: &DateTime<Tz>) -> DistanceRange {
        let days = extremum::days_in_year(instant.year());
        extremum::sample_daily(instant, days, |t| self.distance_au(days_since_j2000(t)))
    }
}

/// Min/max Sun–Earth distance over the year starting at `instant`'s local midnight.
pub fn sun_distance_range<Tz: TimeZone>(instant: &DateTime<Tz>) -> DistanceRange {
    let days = extremum::days_in_year(instant.year());
    extremum::sample_daily(instant, days, |t| sun_distance_au(days_since_j2000(t)))
}
