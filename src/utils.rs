//! Utility functions for locator and path handling.
//!
//! - Base-name extraction from a resource locator
//! - Temporary `.part` path derivation for atomic writes
//! - Destination directory creation

use chrono::{NaiveDate, Utc};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};
use url::Url;

/// Suffix of the scratch file a download is written to before its rename.
pub const TEMP_SUFFIX: &str = ".part";

/// The current calendar date in UTC.
pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Extract the trailing path segment of a locator, as it appears in the URL.
///
/// Percent-escapes are kept, so `Metals%20Report.pdf` is stored under that
/// exact name. Query strings and fragments are ignored. Returns `None` if the locator is
/// not a valid URL or its path has no non-empty segment.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     base_name("https://www.cmegroup.com/delivery_reports/Gold_Stocks.xls").as_deref(),
///     Some("Gold_Stocks.xls")
/// );
/// assert_eq!(base_name("https://www.cmegroup.com/"), None);
/// ```
pub fn base_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.rev().find(|s| !s.is_empty())?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Path of the scratch file for `final_path` (e.g. `a.xls` → `a.xls.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Create `path` and any missing parents. Succeeds if it already exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created (permissions, a file
/// in the way, read-only filesystem).
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| format!("cannot create directory {}: {}", path.display(), e))?;
    debug!("Destination directory ready");
    Ok(())
}
