//! Sequential run over the resource table.

use crate::http::Transport;
use crate::models::{ResourceTable, RunSummary};
use crate::store::fetch_and_store;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Process every locator in `table`, in table order, storing artifacts under
/// `data_dir/<subdir>`.
///
/// Each resource is handled to completion before the next one starts.
/// Per-resource failures are tallied in the returned [`RunSummary`].
///
/// # Errors
///
/// Returns the first fatal error (a destination directory that cannot be
/// created); resources after it are not processed.
#[instrument(level = "info", skip_all, fields(data_dir = %data_dir.display()))]
pub async fn run<T: Transport>(
    transport: &T,
    table: &ResourceTable,
    data_dir: &Path,
) -> Result<RunSummary, Box<dyn Error>> {
    let mut summary = RunSummary::default();

    for group in &table.groups {
        let folder = data_dir.join(group.subdir());
        info!(category = %group.category, folder = %folder.display(), "Processing category");

        for url in &group.urls {
            let outcome = fetch_and_store(transport, url, &folder).await?;
            debug!(%url, %outcome, "Resource done");
            summary.record(&outcome);
        }
    }

    Ok(summary)
}
