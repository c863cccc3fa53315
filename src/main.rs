//! # Moon Clock Application Entry Point
//!
//! Computes a solar-system snapshot at startup and then at every scheduled
//! slot, optionally cross-checks the moon phase, pushes the values to the
//! Awtrix clock and publishes them to the dashboard. Development mode
//! (`--stdout`) renders to the terminal instead of pushing.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use moon_clock_lib::config::{Config, DEFAULT_CONFIG_PATH};
use moon_clock_lib::dashboard::{self, SnapshotHub};
use moon_clock_lib::lunar;
use moon_clock_lib::push::AwtrixClient;
use moon_clock_lib::renderer::{draw_ascii, render_lines};
use moon_clock_lib::schedule::Schedule;
use moon_clock_lib::snapshot::AstronomicalSnapshot;
use moon_clock_lib::verifier::MoonPhaseVerifier;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 1 astronomical unit, for the log banner
const AU_IN_MILES: &str = "92,955,807.273026 miles";

#[derive(Parser, Debug)]
#[command(name = "moon-clock", version, about = "Push solar-system facts to an Awtrix clock")]
struct Args {
    /// Config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Development mode: render to the terminal, never push
    #[arg(long)]
    stdout: bool,

    /// Run one update and exit
    #[arg(long)]
    once: bool,

    /// Observer latitude in degrees, overriding config and environment
    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<f64>,
}

/// Everything one update needs, built once at startup.
struct App {
    config: Config,
    development_mode: bool,
    awtrix: Option<AwtrixClient>,
    verifier: MoonPhaseVerifier,
    hub: SnapshotHub,
}

impl App {
    /// Compute, verify, report and publish one snapshot.
    async fn update(&self) {
        info!("=== Update starting ===");
        let now = Local::now();
        info!(
            date = %now.format("%Y-%m-%d"),
            day = %now.format("%A"),
            time = %now.format("%H:%M:%S"),
            "1 astronomical unit = {}",
            AU_IN_MILES
        );

        let computed = AstronomicalSnapshot::compute(&now, self.config.observer.latitude);
        let calculated = computed.moon_phase();
        let verification = self
            .verifier
            .verify(lunar::phase_date(&now), calculated.category_name())
            .await;
        let snapshot = computed.with_moon_phase(verification.adopt(calculated));

        if self.development_mode {
            draw_ascii(&snapshot);
        } else {
            for line in render_lines(&snapshot) {
                info!("{}", line);
            }
        }

        if let Some(awtrix) = &self.awtrix {
            awtrix.push_snapshot(&snapshot).await;
        }

        if let Err(e) = self.hub.publish(&snapshot) {
            warn!(error = %e, "Could not publish snapshot to dashboard");
        }
        info!("=== Update completed ===");
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::load(&args.config, args.latitude);
    info!(
        latitude = config.observer.latitude,
        host = %config.device.hostname,
        "Configuration ready"
    );

    let awtrix = if args.stdout {
        None
    } else {
        let client = AwtrixClient::new(&config.device).context("building Awtrix HTTP client")?;
        client.check_connectivity().await;
        Some(client)
    };
    let verifier =
        MoonPhaseVerifier::from_config(&config.verifier).context("building verifier HTTP client")?;

    let hub = SnapshotHub::new();
    if config.dashboard.enabled && !args.once {
        let listener = tokio::net::TcpListener::bind(&config.dashboard.bind)
            .await
            .with_context(|| format!("binding dashboard on {}", config.dashboard.bind))?;
        let dashboard_hub = hub.clone();
        tokio::spawn(async move {
            if let Err(e) = dashboard::serve(listener, dashboard_hub).await {
                warn!(error = %e, "Dashboard stopped");
            }
        });
    }

    let schedule = Schedule::from_config(&config.schedule);
    let app = App {
        config,
        development_mode: args.stdout,
        awtrix,
        verifier,
        hub,
    };

    info!("Application started - running initial update");
    app.update().await;
    if args.once {
        return Ok(());
    }

    loop {
        let now = Local::now();
        let next = schedule.next_after(&now);
        info!(next = %next.format("%Y-%m-%d %H:%M"), "Waiting for next update");
        tokio::select! {
            _ = tokio::time::sleep(schedule.sleep_until_next(&now)) => app.update().await,
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    if let Some(awtrix) = &app.awtrix {
        info!(
            succeeded = awtrix.stats().succeeded(),
            failed = awtrix.stats().failed(),
            "Shutting down - Awtrix stats"
        );
    }
    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(args))
}
