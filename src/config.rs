//! # Configuration Management
//!
//! Loads `moon-clock.toml`: observer latitude, the Awtrix device, the optional
//! moon-phase verifier, update schedule and dashboard. Every section has
//! defaults, so a partial file (or no file at all) is valid. The environment
//! variables `AWTRIXHOSTNAME` and `LATITUDE` override the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "moon-clock.toml";

/// Royal Observatory, Greenwich.
pub const DEFAULT_LATITUDE: f64 = 51.4769;

pub const HOSTNAME_ENV_VAR: &str = "AWTRIXHOSTNAME";
pub const LATITUDE_ENV_VAR: &str = "LATITUDE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialise config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration loaded from moon-clock.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub observer: ObserverConfig,
    pub device: DeviceConfig,
    pub verifier: VerifierConfig,
    pub schedule: ScheduleConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Degrees north; negative for the southern hemisphere
    pub latitude: f64,
}

/// Awtrix clock reachable over HTTP
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Base URL, e.g. `http://moonclock.local`
    pub hostname: String,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    /// Per-request timeout
    pub timeout_secs: u64,
}

/// Cross-check of the calculated moon phase against the Anthropic Messages API
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub enabled: bool,
    /// Environment variable holding the API key; the key itself never lives in the file
    pub api_key_env: String,
    pub model: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Minute past the hour for each update
    pub minute: u32,
    /// Local hours (0-23) at which updates run
    pub hours: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    /// Listen address for the SSE endpoint
    pub bind: String,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        ObserverConfig {
            latitude: DEFAULT_LATITUDE,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            hostname: "http://moonclock.local".to_string(),
            max_attempts: 3,
            retry_delay_ms: 2000,
            timeout_secs: 5,
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        VerifierConfig {
            enabled: true,
            api_key_env: "CLAUDE_API_KEY".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        // 00:01 and 12:01 local
        ScheduleConfig {
            minute: 1,
            hours: vec![0, 12],
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            enabled: false,
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    /// Load `path`, then apply environment and command-line overrides.
    /// Falls back to default configuration if the file doesn't exist or is invalid.
    pub fn load<P: AsRef<Path>>(path: P, latitude: Option<f64>) -> Self {
        Self::load_with(path, |key| std::env::var(key).ok(), latitude)
    }

    /// [`Config::load`] with an explicit environment lookup.
    /// Precedence: `latitude` over environment over file over defaults.
    pub fn load_with<P, F>(path: P, lookup: F, latitude: Option<f64>) -> Self
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load_from_path(path);
        config.apply_env(lookup);
        if let Some(latitude) = latitude {
            config.observer.latitude = latitude;
        }
        config.validate();
        config
    }

    /// Load configuration from the specified path.
    /// Falls back to default configuration if the file doesn't exist or is invalid.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load_from_path(path) {
            Ok(mut config) => {
                info!(path = %path.display(), "Loaded configuration");
                config.validate();
                config
            }
            Err(ConfigError::Io(_)) => {
                info!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Strict variant of [`Config::load_from_path`]: no fallback, no validation.
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Apply `AWTRIXHOSTNAME` and `LATITUDE` through `lookup`.
    ///
    /// An unparsable latitude is ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(hostname) = lookup(HOSTNAME_ENV_VAR).filter(|h| !h.trim().is_empty()) {
            self.device.hostname = hostname.trim().to_string();
        }
        if let Some(raw) = lookup(LATITUDE_ENV_VAR) {
            match raw.trim().parse::<f64>() {
                Ok(latitude) => self.observer.latitude = latitude,
                Err(_) => warn!(value = %raw, "Ignoring unparsable {}", LATITUDE_ENV_VAR),
            }
        }
    }

    /// Replace an out-of-range latitude with Greenwich and clamp obviously
    /// unusable device settings.
    pub fn validate(&mut self) {
        let lat = self.observer.latitude;
        if !(-90.0..=90.0).contains(&lat) {
            warn!(
                latitude = lat,
                fallback = DEFAULT_LATITUDE,
                "Invalid latitude, must be between -90 and 90; using Greenwich"
            );
            self.observer.latitude = DEFAULT_LATITUDE;
        }
        if self.device.max_attempts == 0 {
            warn!("device.max_attempts is 0; using 1");
            self.device.max_attempts = 1;
        }
        let hostname = self.device.hostname.trim_end_matches('/');
        if hostname.len() != self.device.hostname.len() {
            self.device.hostname = hostname.to_string();
        }
    }

    /// Write the configuration as pretty TOML.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!(path = %path.as_ref().display(), "Configuration saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.observer.latitude, 51.4769);
        assert_eq!(config.device.hostname, "http://moonclock.local");
        assert_eq!(config.device.max_attempts, 3);
        assert_eq!(config.device.retry_delay_ms, 2000);
        assert_eq!(config.schedule.minute, 1);
        assert_eq!(config.schedule.hours, vec![0, 12]);
        assert_eq!(config.verifier.api_key_env, "CLAUDE_API_KEY");
        assert!(!config.dashboard.enabled);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str("[observer]\nlatitude = -33.9\n").unwrap();
        assert_eq!(parsed.observer.latitude, -33.9);
        assert_eq!(parsed.device, DeviceConfig::default());
        assert_eq!(parsed.schedule, ScheduleConfig::default());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path/moon-clock.toml");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moon-clock.toml");
        fs::write(&path, "observer = [not valid").unwrap();

        assert!(matches!(
            Config::try_load_from_path(&path),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(Config::load_from_path(&path), Config::default());
    }

    #[test]
    fn test_load_layers_file_env_and_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moon-clock.toml");
        fs::write(&path, "[observer]\nlatitude = 10.0\n\n[device]\nhostname = \"http://a/\"\n")
            .unwrap();
        let lookup = env(&[(LATITUDE_ENV_VAR, "20.0")]);

        let config = Config::load_with(&path, &lookup, None);
        assert_eq!(config.observer.latitude, 20.0);
        assert_eq!(config.device.hostname, "http://a");

        assert_eq!(Config::load_with(&path, &lookup, Some(-30.0)).observer.latitude, -30.0);
        assert_eq!(
            Config::load_with(&path, &lookup, Some(120.0)).observer.latitude,
            DEFAULT_LATITUDE
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moon-clock.toml");
        let mut config = Config::default();
        config.observer.latitude = 35.68;
        config.device.hostname = "http://192.168.1.40".to_string();
        config.schedule.hours = vec![6, 18];
        config.dashboard.enabled = true;

        config.save_to_path(&path).unwrap();
        assert_eq!(Config::load_from_path(&path), config);
    }

    #[test]
    fn test_out_of_range_latitude_falls_back_to_greenwich() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moon-clock.toml");
        fs::write(&path, "[observer]\nlatitude = 123.0\n").unwrap();
        assert_eq!(Config::load_from_path(&path).observer.latitude, DEFAULT_LATITUDE);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("AWTRIXHOSTNAME", "http://awtrix.lan"),
            ("LATITUDE", " -41.29 "),
        ]));
        assert_eq!(config.device.hostname, "http://awtrix.lan");
        assert_eq!(config.observer.latitude, -41.29);
    }

    #[test]
    fn test_env_garbage_latitude_is_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("LATITUDE", "north"), ("AWTRIXHOSTNAME", "  ")]));
        assert_eq!(config.observer.latitude, DEFAULT_LATITUDE);
        assert_eq!(config.device.hostname, "http://moonclock.local");
    }

    #[test]
    fn test_env_latitude_is_validated() {
        let mut config = Config::default();
        config.apply_env(env(&[("LATITUDE", "-95")]));
        config.validate();
        assert_eq!(config.observer.latitude, DEFAULT_LATITUDE);
    }

    #[test]
    fn test_validate_trims_trailing_slash_and_zero_attempts() {
        let mut config = Config::default();
        config.device.hostname = "http://awtrix.lan/".to_string();
        config.device.max_attempts = 0;
        config.validate();
        assert_eq!(config.device.hostname, "http://awtrix.lan");
        assert_eq!(config.device.max_attempts, 1);
    }
}
