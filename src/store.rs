//! Date-stamped artifact storage.
//!
//! Each resource is stored as `{dest_dir}/{YYYY-MM-DD}_{basename}`, where the
//! date is the resolved publication date. The existence of that name is the
//! only record kept: if it is already present the resource is skipped without
//! downloading it again.
//!
//! ```text
//! data/
//! ├── stocks/
//! │   ├── 2024-03-14_Gold_Stocks.xls
//! │   └── 2024-03-15_Gold_Stocks.xls
//! └── notices/
//!     └── metals/
//!         └── 2024-03-15_MetalsIssuesAndStopsReport.pdf
//! ```
//!
//! Downloads are written to a `.part` file and renamed into place, so an
//! artifact name never refers to a truncated file.

use crate::http::Transport;
use crate::models::FetchOutcome;
use crate::resolver::resolve_publication_date;
use crate::utils::{base_name, ensure_dir, temp_path};
use chrono::NaiveDate;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, info, instrument};

/// Compose the stored artifact name for `basename` published on `date`.
///
/// # Examples
///
/// ```ignore
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// assert_eq!(artifact_name(date, "Gold_Stocks.xls"), "2024-03-15_Gold_Stocks.xls");
/// ```
pub fn artifact_name(date: NaiveDate, basename: &str) -> String {
    format!("{}_{}", date.format("%Y-%m-%d"), basename)
}

/// Ensure exactly one artifact exists for the resource's current publication date.
///
/// Download and write failures are logged and returned as
/// [`FetchOutcome::Failed`].
///
/// # Errors
///
/// Only a failure to create `dest_dir` is returned as an error.
#[instrument(level = "info", skip(transport, dest_dir), fields(dest_dir = %dest_dir.display()))]
pub async fn fetch_and_store<T: Transport>(
    transport: &T,
    url: &str,
    dest_dir: &Path,
) -> Result<FetchOutcome, Box<dyn Error>> {
    ensure_dir(dest_dir).await?;

    let Some(basename) = base_name(url) else {
        let reason = "locator has no file name".to_string();
        error!(%url, %reason, "Failed to download");
        return Ok(FetchOutcome::Failed { reason });
    };

    let resolved = resolve_publication_date(transport, url).await;
    let file_name = artifact_name(resolved.date, &basename);
    let path = dest_dir.join(&file_name);

    match fs::try_exists(&path).await {
        Ok(true) => {
            info!(file = %file_name, "Skipping (already exists)");
            return Ok(FetchOutcome::Skipped { path });
        }
        Ok(false) => {}
        Err(e) => {
            let reason = format!("cannot check {}: {}", path.display(), e);
            error!(%url, %reason, "Failed to download");
            return Ok(FetchOutcome::Failed { reason });
        }
    }

    info!(file = %file_name, date_source = %resolved.source, "Downloading new version");
    let body = match transport.fetch(url).await {
        Ok(body) => body,
        Err(e) => {
            let reason = e.to_string();
            error!(%url, %reason, "Failed to download");
            return Ok(FetchOutcome::Failed { reason });
        }
    };

    if let Err(e) = write_atomically(&path, &body).await {
        let reason = e.to_string();
        error!(%url, path = %path.display(), %reason, "Failed to write artifact");
        return Ok(FetchOutcome::Failed { reason });
    }

    info!(path = %path.display(), bytes = body.len(), "Wrote artifact");
    Ok(FetchOutcome::Downloaded {
        path,
        bytes: body.len(),
    })
}

/// Write `body` to `<path>.part`, then rename it onto `path`.
///
/// On failure the `.part` file is removed and `path` is left untouched.
async fn write_atomically(path: &Path, body: &[u8]) -> Result<(), Box<dyn Error>> {
    let tmp = temp_path(path);
    let result: std::io::Result<()> = async {
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = result {
        if let Err(cleanup) = fs::remove_file(&tmp).await {
            debug!(tmp = %tmp.display(), error = %cleanup, "No scratch file to remove");
        }
        return Err(format!("cannot write {}: {}", path.display(), e).into());
    }
    Ok(())
}
