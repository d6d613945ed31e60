//! # report_fetch
//!
//! Keeps a dated archive of published exchange reports (CME Group delivery
//! reports by default): spreadsheets of warehouse stocks and PDF notices of
//! issues and stops.
//!
//! ## Usage
//!
//! ```sh
//! report_fetch                      # built-in table into ./data
//! report_fetch -d /srv/reports -t reports.yaml
//! ```
//!
//! Meant to be run periodically by an external scheduler (cron, systemd timer).
//!
//! ## Architecture
//!
//! For every report in the resource table, in order:
//! 1. **Probe**: HEAD request for `Last-Modified`, falling back to today's UTC date
//! 2. **Decide**: skip if `<subdir>/<YYYY-MM-DD>_<basename>` already exists
//! 3. **Fetch**: GET the body and write it under that name
//!
//! Per-report failures are logged and the run continues; the process exits
//! successfully unless the environment itself is broken (e.g. the storage
//! root cannot be created).

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod driver;
mod http;
mod models;
mod resolver;
mod store;
mod utils;

use cli::Cli;
use http::HttpTransport;

#[tokio::main(flavor = "current_thread")]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("report_fetch starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let table = config::load_table(args.table.as_deref()).await?;
    let transport = HttpTransport::new(args.timeouts())?;

    let summary = driver::run(&transport, &table, &args.data_dir).await?;

    let elapsed = start_time.elapsed();
    info!(
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        failed = summary.failed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    if summary.failed > 0 {
        warn!(failed = summary.failed, total = summary.total(), "Some reports could not be downloaded");
    }

    Ok(())
}
