//! Deep-space probes on straight-line outbound trajectories.
//!
//! Each probe carries a reference heliocentric distance at 2024-01-01 00:00 UTC
//! and a constant radial speed. Distance from Earth is approximated as
//! `|heliocentric − 1 AU|`; at 50+ AU the error from ignoring Earth's position
//! is well under a percent.

use crate::time_basis::SECONDS_PER_DAY;
use serde::{Deserialize, Serialize};

/// Kilometres in one astronomical unit.
pub const KM_PER_AU: f64 = 149_597_870.7;

/// Reference epoch 2024-01-01 00:00 UTC expressed in days since J2000.0.
pub const REFERENCE_EPOCH_J2000_DAYS: f64 = 8_765.5;

/// Linear-drift parameters for one probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftElements {
    /// Heliocentric distance at the reference epoch (AU)
    pub reference_distance_au: f64,
    /// Radial speed away from the Sun (km/s)
    pub radial_speed_km_s: f64,
}

impl DriftElements {
    /// Radial speed converted to AU per day.
    pub fn au_per_day(&self) -> f64 {
        self.radial_speed_km_s * SECONDS_PER_DAY / KM_PER_AU
    }

    /// Heliocentric distance (AU) at `d` days since J2000.0.
    pub fn heliocentric_au(&self, d: f64) -> f64 {
        self.reference_distance_au + self.au_per_day() * (d - REFERENCE_EPOCH_J2000_DAYS)
    }

    /// Earth–probe distance (AU), never negative.
    pub fn geocentric_au(&self, d: f64) -> f64 {
        (self.heliocentric_au(d) - 1.0).abs().max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Probe {
    Voyager1,
    Voyager2,
    NewHorizons,
}

impl Probe {
    pub const ALL: [Probe; 3] = [Probe::Voyager1, Probe::Voyager2, Probe::NewHorizons];

    pub fn elements(self) -> DriftElements {
        match self {
            Probe::Voyager1 => DriftElements {
                reference_distance_au: 159.0,
                radial_speed_km_s: 17.0,
            },
            Probe::Voyager2 => DriftElements {
                reference_distance_au: 133.0,
                radial_speed_km_s: 15.4,
            },
            Probe::NewHorizons => DriftElements {
                reference_distance_au: 58.0,
                radial_speed_km_s: 13.8,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Probe::Voyager1 => "Voyager 1",
            Probe::Voyager2 => "Voyager 2",
            Probe::NewHorizons => "New Horizons",
        }
    }

    pub fn distance_au(self, d: f64) -> f64 {
        self.elements().geocentric_au(d)
    }
}
