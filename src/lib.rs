//! # Moon Clock Core Library
//!
//! Closed-form approximations that turn a timestamp into solar-system
//! geometry for a wall display: planetary and lunar distances, moon phase,
//! day length, Earth's orbital speed, light-travel times and seasonal
//! countdowns.
//!
//! ## Design Philosophy
//!
//! ### One instant, one `d`
//! Every distance model consumes `d`, the fractional days since J2000.0
//! (2000-01-01 12:00 UTC), derived once per instant by
//! [`time_basis::days_since_j2000`]. [`snapshot::AstronomicalSnapshot::compute`]
//! holds a single instant fixed for every model so the outputs agree.
//!
//! ### Accuracy
//! First-order Keplerian orbits, linear drift for the deep-space probes, a
//! mean synodic month for the phase. Good to a few percent; fine for a clock,
//! not for navigation.
//!
//! ### Pure core, thin shells
//! The model modules do no I/O and never log. The shell modules
//! ([`push`], [`verifier`], [`dashboard`], [`schedule`], [`config`]) move the
//! results to the outside world.
//!
//! ## Example
//! ```
//! use chrono::{TimeZone, Utc};
//! use moon_clock_lib::lunar::{MoonPhaseState, PhaseCategory};
//! use moon_clock_lib::snapshot::AstronomicalSnapshot;
//!
//! let now = Utc.with_ymd_and_hms(2025, 12, 30, 12, 0, 0).unwrap();
//! assert_eq!(MoonPhaseState::from_instant(&now).category, PhaseCategory::NewMoon);
//!
//! let snapshot = AstronomicalSnapshot::compute(&now, 51.4769);
//! assert_eq!(snapshot.phase_name, "New Moon");
//! assert!(snapshot.earth_speed_km_per_sec > 29.0);
//! ```

// Core models
pub mod daylight;
pub mod drift;
pub mod events;
pub mod extremum;
pub mod light_time;
pub mod lunar;
pub mod orbit;
pub mod speed;
pub mod time_basis;

// Assembly and shells
pub mod config;
pub mod dashboard;
pub mod push;
pub mod renderer;
pub mod schedule;
pub mod snapshot;
pub mod verifier;
