//! # Group Feed Collector
//!
//! Collects posts and comments from a social-network group feed by driving a
//! real browser, and stores them as a CSV file and as MongoDB documents.
//!
//! ## Features
//!
//! - Logs in through the site's login form (credentials from flags, env or `.env`)
//! - Scrolls the group feed, re-reading rendered posts after every scroll
//! - Deduplicates posts across passes by their text, stops once the feed dries up
//! - Turns relative (`2h`, `5 min`) and French absolute (`6 juin à 10:30`)
//!   labels into ISO-8601 local timestamps
//! - Runs once (`--once`) or every day on a cron schedule
//!
//! ## Usage
//!
//! ```sh
//! chromedriver --port=9515 &
//! FB_EMAIL=me@example.com FB_PASSWORD=secret group_feed_collector --once
//! ```
//!
//! ## Architecture
//!
//! 1. **Session**: a WebDriver browser session is opened and logged in
//! 2. **Collection**: extract → merge → scroll, until three empty passes in a
//!    row or the pass budget runs out
//! 3. **Release**: the browser is closed on every path
//! 4. **Output**: the accumulated posts go to CSV and MongoDB, independently

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod collector;
mod config;
mod dates;
mod driver;
mod error;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::Settings;
use utils::{ensure_writable_parent, open_log_file};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let args = Cli::parse();
    init_tracing(args.log_file.as_deref())?;

    info!("group_feed_collector starting up");
    debug!(feed_url = %args.feed_url, output_path = %args.output_path.display(), "Parsed CLI arguments");

    let settings = match Settings::from_cli(&args) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    // Early check: ensure the CSV can be written
    if let Err(e) = ensure_writable_parent(&settings.sinks.output_path).await {
        error!(
            path = %settings.sinks.output_path.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    if args.once {
        collector::run(&settings).await;
        return Ok(());
    }

    let schedule = settings.schedule.clone();
    let settings = Arc::new(settings);
    // Held for the duration of a run so overlapping triggers are skipped.
    let active = Arc::new(Mutex::new(()));

    let mut scheduler = JobScheduler::new().await?;
    let job = Job::new_async_tz(schedule.as_str(), Local, move |_uuid, _scheduler| {
        let settings = Arc::clone(&settings);
        let active = Arc::clone(&active);
        Box::pin(async move {
            let Ok(_guard) = active.try_lock() else {
                warn!("Previous run still active; skipping this trigger");
                return;
            };
            collector::run(&settings).await;
        })
    })?;
    scheduler.add(job).await?;
    scheduler.start().await?;
    info!(%schedule, "Scheduler started; waiting for the daily trigger");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    scheduler.shutdown().await?;

    Ok(())
}

/// Stdout logging, plus a plain-text copy appended to `log_file` when given.
fn init_tracing(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                tfmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(std::sync::Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tfmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .with_timer(UtcTime::rfc_3339()),
        )
        .with(file_layer)
        .init();
    Ok(())
}
