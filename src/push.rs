//! # Awtrix Display Push
//!
//! Pushes snapshot values to an Awtrix clock as custom apps. Each app is a
//! POST of `{"name","text","save","effect","icon"}` to
//! `<hostname>/api/custom?name=<app>`.
//!
//! Delivery is best effort: every push gets a bounded number of attempts, and
//! the outcome is counted and logged. A failed push never aborts an update.

use crate::config::DeviceConfig;
use crate::lunar;
use crate::snapshot::AstronomicalSnapshot;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PushError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{app}: gave up after {attempts} attempt(s): {last}")]
    Exhausted {
        app: String,
        attempts: u32,
        last: String,
    },
}

/// One custom app as shown on the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub app: &'static str,
    pub text: String,
    pub icon: String,
}

impl DisplayMessage {
    fn new(app: &'static str, text: String, icon: impl Into<String>) -> Self {
        Self {
            app,
            text,
            icon: icon.into(),
        }
    }
}

/// JSON body accepted by `/api/custom`.
#[derive(Debug, Serialize)]
pub struct CustomAppPayload<'a> {
    pub name: &'a str,
    pub text: &'a str,
    pub save: &'a str,
    pub effect: &'a str,
    pub icon: &'a str,
}

impl<'a> From<&'a DisplayMessage> for CustomAppPayload<'a> {
    fn from(msg: &'a DisplayMessage) -> Self {
        CustomAppPayload {
            name: msg.app,
            text: &msg.text,
            save: "1",
            effect: "",
            icon: &msg.icon,
        }
    }
}

/// Apps pushed for a snapshot, in display order.
pub fn display_messages(s: &AstronomicalSnapshot) -> Vec<DisplayMessage> {
    vec![
        DisplayMessage::new("marsDistanceAu", format!("{:.1}au", s.mars_distance_au), "MARS"),
        DisplayMessage::new(
            "jupiterDistanceAu",
            format!("{:.1}au", s.jupiter_distance_au),
            "JUPITER",
        ),
        DisplayMessage::new("saturnDistanceAu", format!("{:.1}au", s.saturn_distance_au), "SATURN"),
        DisplayMessage::new("CurrentDayLength", format!("{:.1}hrs", s.daylight_hours), "DAYLENGTH"),
        DisplayMessage::new("voyager1", format!("V1:{:.0}au", s.voyager1_distance_au), "VOYAGER"),
        DisplayMessage::new("voyager2", format!("V2:{:.0}au", s.voyager2_distance_au), "VOYAGER"),
        DisplayMessage::new(
            "newhorizons",
            format!("NH:{:.0}au", s.new_horizons_distance_au),
            "NEWHORIZONS",
        ),
        DisplayMessage::new(
            "summersolstice",
            format!("{}d", s.days_until_summer_solstice),
            "SUMMER",
        ),
        DisplayMessage::new(
            "wintersolstice",
            format!("{}d", s.days_until_winter_solstice),
            "WINTER",
        ),
        DisplayMessage::new("perihelion", format!("{}d", s.days_until_perihelion), "PERIHELION"),
        DisplayMessage::new("aphelion", format!("{}d", s.days_until_aphelion), "PERIHELION"),
        DisplayMessage::new("earthSpeed", format!("{:.1}km/s", s.earth_speed_km_per_sec), "EARTH"),
        DisplayMessage::new(
            "moonDistance",
            format!("{}km", lunar::group_thousands(s.moon_distance_km.round() as i64)),
            "MOON",
        ),
        DisplayMessage::new("lightMars", format!("Lt:{}", s.light_time_earth_to_mars), "LIGHT"),
        DisplayMessage::new(
            "lightJupiter",
            format!("Lt:{}", s.light_time_earth_to_jupiter),
            "LIGHT",
        ),
        DisplayMessage::new("moonphase", s.phase_name.clone(), s.phase_icon.as_str()),
        DisplayMessage::new(
            "moonillumination",
            format!("{}%", s.illumination_percent),
            s.phase_icon.as_str(),
        ),
        DisplayMessage::new("fullmoon", format!("{}d", s.days_until_full_moon), "FullMoon"),
    ]
}

/// Running totals of push outcomes.
#[derive(Debug, Default)]
pub struct PushStats {
    succeeded: AtomicU32,
    failed: AtomicU32,
}

impl PushStats {
    pub fn succeeded(&self) -> u32 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u32 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// HTTP client for one Awtrix device.
pub struct AwtrixClient {
    http: reqwest::Client,
    base_url: String,
    max_attempts: u32,
    retry_delay: Duration,
    stats: PushStats,
}

impl AwtrixClient {
    pub fn new(device: &DeviceConfig) -> Result<Self, PushError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(device.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            base_url: device.hostname.trim_end_matches('/').to_string(),
            max_attempts: device.max_attempts.max(1),
            retry_delay: Duration::from_millis(device.retry_delay_ms),
            stats: PushStats::default(),
        })
    }

    pub fn app_url(&self, app: &str) -> String {
        format!("{}/api/custom?name={}", self.base_url, app)
    }

    pub fn stats(&self) -> &PushStats {
        &self.stats
    }

    async fn send_once(&self, message: &DisplayMessage) -> Result<u16, reqwest::Error> {
        let response = self
            .http
            .post(self.app_url(message.app))
            .json(&CustomAppPayload::from(message))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.status().as_u16())
    }

    /// Push one app, retrying up to the configured attempt count.
    /// Returns the HTTP status of the accepted request.
    pub async fn push(&self, message: &DisplayMessage) -> Result<u16, PushError> {
        debug!(app = message.app, url = %self.app_url(message.app), "Awtrix push");

        let mut last_error = String::new();
        for attempt in 1..=self.max_attempts {
            match self.send_once(message).await {
                Ok(status) => {
                    info!(app = message.app, status, "Awtrix response");
                    self.stats.succeeded.fetch_add(1, Ordering::Relaxed);
                    return Ok(status);
                }
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < self.max_attempts {
                        warn!(
                            app = message.app,
                            attempt,
                            max_attempts = self.max_attempts,
                            retry_in_ms = self.retry_delay.as_millis() as u64,
                            error = %e,
                            "Awtrix send failed, retrying"
                        );
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        warn!(
            app = message.app,
            attempts = self.max_attempts,
            error = %last_error,
            "Awtrix send failed"
        );
        self.stats.failed.fetch_add(1, Ordering::Relaxed);
        Err(PushError::Exhausted {
            app: message.app.to_string(),
            attempts: self.max_attempts,
            last: last_error,
        })
    }

    /// Push every app for a snapshot. Failures are logged and counted only.
    pub async fn push_snapshot(&self, snapshot: &AstronomicalSnapshot) {
        for message in display_messages(snapshot) {
            // Already logged and counted inside push
            let _ = self.push(&message).await;
        }
        info!(
            succeeded = self.stats.succeeded(),
            failed = self.stats.failed(),
            "Awtrix update summary"
        );
    }

    /// GET `/api/stats` once to report whether the device is reachable.
    pub async fn check_connectivity(&self) -> bool {
        let url = format!("{}/api/stats", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                info!(
                    host = %self.base_url,
                    status = response.status().as_u16(),
                    "Awtrix reachable"
                );
                true
            }
            Ok(response) => {
                warn!(
                    host = %self.base_url,
                    status = response.status().as_u16(),
                    "Awtrix responded with unexpected status, pushes may fail"
                );
                false
            }
            Err(e) => {
                warn!(
                    host = %self.base_url,
                    error = %e,
                    "Awtrix not reachable, pushes will fail until it comes online"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snapshot() -> AstronomicalSnapshot {
        let now = Utc.with_ymd_and_hms(2026, 1, 6, 12, 0, 0).unwrap();
        AstronomicalSnapshot::compute(&now, 51.4769)
    }

    #[test]
    fn payload_matches_custom_app_schema() {
        let msg = DisplayMessage::new("fullmoon", "8d".to_string(), "FullMoon");
        let json = serde_json::to_value(CustomAppPayload::from(&msg)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "fullmoon",
                "text": "8d",
                "save": "1",
                "effect": "",
                "icon": "FullMoon"
            })
        );
    }

    #[test]
    fn app_url_appends_custom_endpoint() {
        let device = DeviceConfig {
            hostname: "http://awtrix.lan/".to_string(),
            ..DeviceConfig::default()
        };
        let client = AwtrixClient::new(&device).unwrap();
        assert_eq!(client.app_url("moonphase"), "http://awtrix.lan/api/custom?name=moonphase");
    }

    #[test]
    fn messages_cover_every_app_once() {
        let messages = display_messages(&snapshot());
        assert_eq!(messages.len(), 18);
        let mut apps: Vec<_> = messages.iter().map(|m| m.app).collect();
        apps.sort_unstable();
        apps.dedup();
        assert_eq!(apps.len(), 18);
    }

    #[test]
    fn message_texts_follow_display_formats() {
        let s = snapshot();
        let messages = display_messages(&s);
        let text = |app: &str| messages.iter().find(|m| m.app == app).unwrap().text.clone();

        assert_eq!(text("moonphase"), "First Quarter");
        assert_eq!(text("moonillumination"), format!("{}%", s.illumination_percent));
        assert_eq!(text("fullmoon"), "8d");
        assert_eq!(text("wintersolstice"), "349d");
        assert!(text("voyager1").starts_with("V1:"));
        assert!(text("voyager1").ends_with("au"));
        assert!(text("moonDistance").ends_with("km"));
        assert!(text("moonDistance").contains(','));
        assert!(text("lightMars").starts_with("Lt:"));
        assert!(text("earthSpeed").ends_with("km/s"));
        assert!(text("CurrentDayLength").ends_with("hrs"));
    }

    #[test]
    fn moon_apps_use_phase_icon() {
        let s = snapshot();
        let messages = display_messages(&s);
        let icon = |app: &str| messages.iter().find(|m| m.app == app).unwrap().icon.clone();
        assert_eq!(icon("moonphase"), s.phase_icon);
        assert_eq!(icon("moonillumination"), s.phase_icon);
        assert_eq!(icon("fullmoon"), "FullMoon");
    }

    #[tokio::test]
    async fn unreachable_device_counts_one_failure_per_app() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let device = DeviceConfig {
            hostname: format!("http://{}", addr),
            max_attempts: 2,
            retry_delay_ms: 0,
            timeout_secs: 2,
        };
        let client = AwtrixClient::new(&device).unwrap();
        let msg = DisplayMessage::new("aphelion", "179d".to_string(), "PERIHELION");

        let err = client.push(&msg).await.unwrap_err();
        assert!(matches!(err, PushError::Exhausted { attempts: 2, .. }));
        assert_eq!(client.stats().failed(), 1);
        assert_eq!(client.stats().succeeded(), 0);
        assert!(!client.check_connectivity().await);
    }
}
