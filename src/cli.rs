//! Command-line interface definitions for report_fetch.
//!
//! Every option has a default, so a bare invocation (the usual way the
//! periodic job runs it) fetches the built-in report table into `./data`.
//! Options can also be set through environment variables.

use crate::config::{DEFAULT_DATA_DIR, DEFAULT_FETCH_TIMEOUT, DEFAULT_PROBE_TIMEOUT, Timeouts};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for report_fetch.
///
/// # Examples
///
/// ```sh
/// # Built-in table into ./data
/// report_fetch
///
/// # Custom storage root and table
/// report_fetch --data-dir /srv/reports --table reports.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Root storage directory; one subdirectory per category is created below it
    #[arg(short, long, env = "REPORT_FETCH_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// YAML resource table replacing the built-in one
    #[arg(short, long, env = "REPORT_FETCH_TABLE")]
    pub table: Option<PathBuf>,

    /// Timeout for the metadata (HEAD) request, in seconds
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    pub probe_timeout_secs: u64,

    /// Timeout for the content (GET) request, in seconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    pub fetch_timeout_secs: u64,
}

impl Cli {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            probe: Duration::from_secs(self.probe_timeout_secs),
            fetch: Duration::from_secs(self.fetch_timeout_secs),
        }
    }
}
