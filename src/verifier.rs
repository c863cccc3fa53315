//! # Moon Phase Verification
//!
//! Asks the Anthropic Messages API for the phase name on a date and compares
//! it with the calculated category. The call never fails from the caller's
//! point of view: a missing key yields `"N/A"` and any transport or decoding
//! problem yields `"Error"`.

use crate::config::VerifierConfig;
use crate::lunar::MoonPhaseState;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const NOT_CONFIGURED: &str = "N/A";
pub const FAILED: &str = "Error";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 50;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned HTTP {0}")]
    Status(u16),

    #[error("malformed API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Outcome of one cross-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// Phase name from the oracle, or `"N/A"` / `"Error"`
    pub reported: String,
    pub calculated: String,
    pub matches: bool,
    pub details: String,
}

impl Verification {
    fn skipped(calculated: &str) -> Self {
        Self {
            reported: NOT_CONFIGURED.to_string(),
            calculated: calculated.to_string(),
            matches: false,
            details: "Skipped: API key not configured".to_string(),
        }
    }

    fn failed(calculated: &str, details: String) -> Self {
        Self {
            reported: FAILED.to_string(),
            calculated: calculated.to_string(),
            matches: false,
            details,
        }
    }

    /// Compare a reported name with the calculated one, ignoring case and padding.
    pub fn compare(reported: &str, calculated: &str) -> Self {
        let matches = reported.trim().eq_ignore_ascii_case(calculated.trim());
        Self {
            reported: reported.to_string(),
            calculated: calculated.to_string(),
            matches,
            details: if matches {
                "Oracle confirms the calculated phase".to_string()
            } else {
                "Mismatch detected".to_string()
            },
        }
    }

    /// State to display: the oracle's category on a mismatch, otherwise
    /// `calculated`. Unrecognised names (including `"N/A"` and `"Error"`)
    /// keep `calculated`.
    pub fn adopt(&self, calculated: MoonPhaseState) -> MoonPhaseState {
        if self.matches {
            return calculated;
        }
        match MoonPhaseState::from_category_name(&self.reported) {
            Some(corrected) => {
                info!(
                    from = self.calculated.as_str(),
                    to = corrected.category_name(),
                    "Moon phase corrected from oracle"
                );
                corrected
            }
            None => {
                if self.reported != NOT_CONFIGURED && self.reported != FAILED {
                    warn!(
                        reported = self.reported.as_str(),
                        "Unrecognised phase name from oracle, keeping calculated phase"
                    );
                }
                calculated
            }
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Prompt constraining the answer to one canonical phase name.
pub fn prompt_for(date: NaiveDate) -> String {
    format!(
        "What is the moon phase on {}? Reply with ONLY the phase name using one of these \
         exact values: Full Moon, Waning Gibbous, Last Quarter, Waning Crescent, New Moon, \
         Waxing Crescent, First Quarter, Waxing Gibbous. Do not include any other text, \
         explanation, or punctuation.",
        date.format("%Y-%m-%d")
    )
}

/// Text of the first content block, trimmed; `"Unknown"` when there is none.
pub fn extract_phase(body: &str) -> Result<String, VerifyError> {
    let response: MessagesResponse = serde_json::from_str(body)?;
    Ok(response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .map(|text| text.trim().to_string())
        .unwrap_or_else(|| "Unknown".to_string()))
}

pub struct MoonPhaseVerifier {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl MoonPhaseVerifier {
    /// Build from config, reading the key from `api_key_env`. A disabled
    /// verifier behaves like one without a key.
    pub fn from_config(config: &VerifierConfig) -> Result<Self, VerifyError> {
        let api_key = if config.enabled {
            std::env::var(&config.api_key_env).ok()
        } else {
            None
        };
        Self::new(config, api_key)
    }

    pub fn new(config: &VerifierConfig, api_key: Option<String>) -> Result<Self, VerifyError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn ask(&self, api_key: &str, date: NaiveDate) -> Result<String, VerifyError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: [ChatMessage {
                role: "user",
                content: prompt_for(date),
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != reqwest::StatusCode::OK {
            warn!(status = status.as_u16(), body = %body, "Verification API error");
            return Err(VerifyError::Status(status.as_u16()));
        }
        extract_phase(&body)
    }

    /// Cross-check `calculated` for `date`.
    pub async fn verify(&self, date: NaiveDate, calculated: &str) -> Verification {
        let Some(api_key) = self.api_key.as_deref() else {
            info!("Moon phase verification skipped (API key not set)");
            return Verification::skipped(calculated);
        };

        match self.ask(api_key, date).await {
            Ok(reported) => {
                let verification = Verification::compare(&reported, calculated);
                if verification.matches {
                    info!(phase = reported.as_str(), "Oracle confirms moon phase");
                } else {
                    warn!(
                        calculated,
                        reported = reported.as_str(),
                        "Oracle disagrees with calculated moon phase"
                    );
                }
                verification
            }
            Err(e) => {
                warn!(error = %e, "Moon phase verification failed");
                Verification::failed(calculated, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lunar::PhaseCategory;

    fn state(name: &str) -> MoonPhaseState {
        MoonPhaseState::from_category_name(name).unwrap()
    }

    #[test]
    fn extracts_first_text_block() {
        let body = r#"{"id":"msg_1","content":[{"type":"text","text":"  Waxing Gibbous\n"}]}"#;
        assert_eq!(extract_phase(body).unwrap(), "Waxing Gibbous");
    }

    #[test]
    fn empty_content_is_unknown() {
        assert_eq!(extract_phase(r#"{"content":[]}"#).unwrap(), "Unknown");
        assert_eq!(extract_phase(r#"{}"#).unwrap(), "Unknown");
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(extract_phase("<html>"), Err(VerifyError::Decode(_))));
    }

    #[test]
    fn comparison_ignores_case_and_whitespace() {
        assert!(Verification::compare(" first quarter ", "First Quarter").matches);
        assert!(!Verification::compare("Full Moon", "First Quarter").matches);
    }

    #[test]
    fn adopt_keeps_calculated_on_match() {
        let calculated = MoonPhaseState::from_fraction(0.23);
        let v = Verification::compare("First Quarter", "First Quarter");
        assert_eq!(v.adopt(calculated), calculated);
    }

    #[test]
    fn adopt_corrects_on_mismatch() {
        let calculated = state("First Quarter");
        let v = Verification::compare("Full Moon", "First Quarter");
        assert_eq!(v.adopt(calculated).category, PhaseCategory::FullMoon);
    }

    #[test]
    fn adopt_keeps_calculated_for_unknown_or_sentinel_names() {
        let calculated = state("Waning Crescent");
        for reported in ["Blue Moon", "Unknown", NOT_CONFIGURED, FAILED] {
            let v = Verification::compare(reported, "Waning Crescent");
            assert_eq!(v.adopt(calculated), calculated, "{reported}");
        }
        assert_eq!(Verification::skipped("New Moon").adopt(calculated), calculated);
    }

    #[test]
    fn prompt_names_the_date_and_all_phases() {
        let prompt = prompt_for(NaiveDate::from_ymd_opt(2026, 1, 6).unwrap());
        assert!(prompt.contains("2026-01-06"));
        for category in PhaseCategory::ALL {
            assert!(prompt.contains(category.name()), "{}", category.name());
        }
    }

    #[tokio::test]
    async fn missing_key_reports_not_available() {
        let verifier = MoonPhaseVerifier::new(&VerifierConfig::default(), None).unwrap();
        assert!(!verifier.is_configured());
        let v = verifier
            .verify(NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(), "First Quarter")
            .await;
        assert_eq!(v.reported, NOT_CONFIGURED);
        assert_eq!(v.calculated, "First Quarter");
        assert!(!v.matches);
    }

    #[tokio::test]
    async fn unreachable_endpoint_reports_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = VerifierConfig {
            endpoint: format!("http://{}/v1/messages", addr),
            ..VerifierConfig::default()
        };
        let verifier = MoonPhaseVerifier::new(&config, Some("test-key".to_string())).unwrap();
        let v = verifier
            .verify(NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(), "First Quarter")
            .await;
        assert_eq!(v.reported, FAILED);
        assert!(!v.matches);
    }
}
