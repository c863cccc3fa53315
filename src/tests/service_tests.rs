//! # Service Shell Tests
//!
//! Push sink and verifier against a local stub HTTP server, plus the config
//! to schedule handoff.

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use moon_clock_lib::config::{Config, DeviceConfig, VerifierConfig};
use moon_clock_lib::lunar::{self, MoonPhaseState, PhaseCategory};
use moon_clock_lib::push::{display_messages, AwtrixClient, DisplayMessage};
use moon_clock_lib::schedule::Schedule;
use moon_clock_lib::snapshot::AstronomicalSnapshot;
use moon_clock_lib::verifier::{MoonPhaseVerifier, FAILED};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Captured = Arc<Mutex<Vec<String>>>;

/// Read one HTTP request: headers plus a `Content-Length` body.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 2048];
    loop {
        let n = stream.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

/// Stub server answering every request with `status` and `body`.
async fn stub_server(status: &'static str, body: &'static str) -> (SocketAddr, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let request = read_request(&mut stream).await;
            sink.lock().unwrap().push(request);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (addr, captured)
}

fn device_at(addr: SocketAddr, max_attempts: u32) -> DeviceConfig {
    DeviceConfig {
        hostname: format!("http://{}", addr),
        max_attempts,
        retry_delay_ms: 0,
        timeout_secs: 5,
    }
}

fn snapshot() -> AstronomicalSnapshot {
    let now = Utc.with_ymd_and_hms(2026, 1, 6, 12, 0, 0).unwrap();
    AstronomicalSnapshot::compute(&now, 51.4769)
}

#[tokio::test]
async fn push_posts_custom_app_json() {
    let (addr, captured) = stub_server("200 OK", "").await;
    let client = AwtrixClient::new(&device_at(addr, 3)).unwrap();
    let message = DisplayMessage {
        app: "moonphase",
        text: "First Quarter".to_string(),
        icon: "fqmoon".to_string(),
    };

    assert_eq!(client.push(&message).await.unwrap(), 200);
    assert_eq!(client.stats().succeeded(), 1);
    assert_eq!(client.stats().failed(), 0);

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.starts_with("POST /api/custom?name=moonphase HTTP/1.1"));
    assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
    assert!(request.contains(r#""name":"moonphase""#));
    assert!(request.contains(r#""text":"First Quarter""#));
    assert!(request.contains(r#""save":"1""#));
    assert!(request.contains(r#""effect":"""#));
    assert!(request.contains(r#""icon":"fqmoon""#));
}

#[tokio::test]
async fn push_retries_server_errors_then_gives_up() {
    let (addr, captured) = stub_server("500 Internal Server Error", "").await;
    let client = AwtrixClient::new(&device_at(addr, 3)).unwrap();
    let message = DisplayMessage {
        app: "fullmoon",
        text: "8d".to_string(),
        icon: "FullMoon".to_string(),
    };

    assert!(client.push(&message).await.is_err());
    assert_eq!(captured.lock().unwrap().len(), 3);
    assert_eq!(client.stats().failed(), 1);
    assert_eq!(client.stats().succeeded(), 0);
}

#[tokio::test]
async fn snapshot_push_sends_every_app() {
    let (addr, captured) = stub_server("200 OK", "").await;
    let client = AwtrixClient::new(&device_at(addr, 1)).unwrap();
    let snapshot = snapshot();

    client.push_snapshot(&snapshot).await;

    let expected = display_messages(&snapshot).len() as u32;
    assert_eq!(client.stats().succeeded(), expected);
    assert_eq!(captured.lock().unwrap().len(), expected as usize);
    assert!(client.check_connectivity().await);
    let requests = captured.lock().unwrap();
    assert!(requests.last().unwrap().starts_with("GET /api/stats"));
}

#[tokio::test]
async fn verifier_sends_messages_request_and_adopts_answer() {
    let body = r#"{"id":"msg_01","type":"message","content":[{"type":"text","text":"Full Moon"}]}"#;
    let (addr, captured) = stub_server("200 OK", body).await;
    let config = VerifierConfig {
        endpoint: format!("http://{}/v1/messages", addr),
        model: "test-model".to_string(),
        ..VerifierConfig::default()
    };
    let verifier = MoonPhaseVerifier::new(&config, Some("test-key".to_string())).unwrap();

    let date = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
    let calculated = MoonPhaseState::from_date(date);
    let verification = verifier.verify(date, calculated.category_name()).await;

    assert_eq!(verification.reported, "Full Moon");
    assert_eq!(verification.calculated, "First Quarter");
    assert!(!verification.matches);
    assert_eq!(verification.adopt(calculated).category, PhaseCategory::FullMoon);

    let requests = captured.lock().unwrap().clone();
    let request = requests[0].to_ascii_lowercase();
    assert!(request.starts_with("post /v1/messages"));
    assert!(request.contains("x-api-key: test-key"));
    assert!(request.contains("anthropic-version: 2023-06-01"));
    assert!(requests[0].contains(r#""model":"test-model""#));
    assert!(requests[0].contains(r#""max_tokens":50"#));
    assert!(requests[0].contains("2026-01-06"));
}

/// East of UTC the local date runs ahead; the verifier is asked about the
/// same UTC date the phase was computed for.
#[tokio::test]
async fn verifier_is_asked_about_the_utc_date() {
    let body = r#"{"content":[{"type":"text","text":"New Moon"}]}"#;
    let (addr, captured) = stub_server("200 OK", body).await;
    let config = VerifierConfig {
        endpoint: format!("http://{}/v1/messages", addr),
        ..VerifierConfig::default()
    };
    let verifier = MoonPhaseVerifier::new(&config, Some("test-key".to_string())).unwrap();

    let brisbane = FixedOffset::east_opt(10 * 3600).unwrap();
    let now = brisbane.with_ymd_and_hms(2026, 1, 1, 5, 0, 0).unwrap();
    let date = lunar::phase_date(&now);
    assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

    let calculated = MoonPhaseState::from_instant(&now);
    assert_eq!(calculated.category, PhaseCategory::NewMoon);
    let verification = verifier.verify(date, calculated.category_name()).await;
    assert!(verification.matches);

    let requests = captured.lock().unwrap().clone();
    assert!(requests[0].contains("2025-12-31"));
    assert!(!requests[0].contains("2026-01-01"));
}

#[tokio::test]
async fn verifier_maps_http_errors_to_error_outcome() {
    let (addr, _) = stub_server("529 Overloaded", r#"{"type":"error"}"#).await;
    let config = VerifierConfig {
        endpoint: format!("http://{}/v1/messages", addr),
        ..VerifierConfig::default()
    };
    let verifier = MoonPhaseVerifier::new(&config, Some("test-key".to_string())).unwrap();

    let date = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
    let calculated = MoonPhaseState::from_date(date);
    let verification = verifier.verify(date, calculated.category_name()).await;

    assert_eq!(verification.reported, FAILED);
    assert!(verification.details.contains("529"));
    assert_eq!(verification.adopt(calculated), calculated);
}

#[test]
fn config_file_drives_schedule_and_observer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("moon-clock.toml");
    std::fs::write(
        &path,
        "[observer]\nlatitude = -33.87\n\n[schedule]\nminute = 15\nhours = [18, 6]\n",
    )
    .unwrap();

    let config = Config::load_from_path(&path);
    assert_eq!(config.observer.latitude, -33.87);

    let schedule = Schedule::from_config(&config.schedule);
    let now = Utc.with_ymd_and_hms(2026, 1, 6, 7, 0, 0).unwrap();
    assert_eq!(
        schedule.next_after(&now),
        Utc.with_ymd_and_hms(2026, 1, 6, 18, 15, 0).unwrap()
    );
}
