//! Data models for the resource table and per-resource outcomes.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ResourceGroup`] / [`ResourceTable`]: what to fetch and where to store it
//! - [`ResolvedDate`]: a publication date together with where it came from
//! - [`FetchOutcome`]: the non-fatal result of processing one resource
//! - [`RunSummary`]: tallies for a whole run

use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// One row of the resource table: a category and the locators filed under it.
///
/// # Fields
///
/// * `category` - Label printed in progress output (e.g. `"notices/metals"`)
/// * `subdir` - Destination below the storage root; defaults to `category`
/// * `urls` - Resource locators, processed in order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceGroup {
    /// The category label.
    pub category: String,
    /// Relative destination directory; `None` means "same as category".
    #[serde(default)]
    pub subdir: Option<String>,
    /// Remote report locators.
    #[serde(default)]
    pub urls: Vec<String>,
}

impl ResourceGroup {
    pub fn new<S: Into<String>>(category: &str, urls: impl IntoIterator<Item = S>) -> Self {
        Self {
            category: category.to_string(),
            subdir: None,
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    /// The destination subdirectory, relative to the storage root.
    pub fn subdir(&self) -> &str {
        self.subdir.as_deref().unwrap_or(&self.category)
    }
}

/// Ordered list of resource groups. This is the entire input surface of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResourceTable {
    pub groups: Vec<ResourceGroup>,
}

impl ResourceTable {
    /// Total number of locators across all groups.
    pub fn resource_count(&self) -> usize {
        self.groups.iter().map(|g| g.urls.len()).sum()
    }
}

/// Where a publication date was obtained from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSource {
    /// Parsed from the server's `Last-Modified` header.
    LastModified,
    /// The probe gave nothing usable; the current UTC date was used instead.
    Fallback { reason: String },
}

/// A best-effort publication date for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDate {
    pub date: NaiveDate,
    pub source: DateSource,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSource::LastModified => write!(f, "Last-Modified"),
            DateSource::Fallback { reason } => write!(f, "today (fallback: {})", reason),
        }
    }
}

/// Result of processing a single resource.
///
/// Every variant is a normal outcome; a failed download is reported, not raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// An artifact for the resolved date was already present.
    Skipped { path: PathBuf },
    /// A new artifact was written.
    Downloaded { path: PathBuf, bytes: usize },
    /// Retrieval or write failed; nothing was stored.
    Failed { reason: String },
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Skipped { path } => write!(f, "skipped {}", path.display()),
            FetchOutcome::Downloaded { path, bytes } => {
                write!(f, "downloaded {} ({} bytes)", path.display(), bytes)
            }
            FetchOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Per-run tallies, logged when the driver finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Skipped { .. } => self.skipped += 1,
            FetchOutcome::Downloaded { .. } => self.downloaded += 1,
            FetchOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdir_defaults_to_category() {
        let group = ResourceGroup::new("notices/metals", ["https://example.com/a.pdf"]);
        assert_eq!(group.subdir(), "notices/metals");

        let group = ResourceGroup {
            subdir: Some("metals".to_string()),
            ..group
        };
        assert_eq!(group.subdir(), "metals");
    }

    #[test]
    fn test_table_len_counts_all_locators() {
        let table = ResourceTable {
            groups: vec![
                ResourceGroup::new("a", ["https://x/1", "https://x/2"]),
                ResourceGroup::new("b", ["https://x/3"]),
            ],
        };
        assert_eq!(table.resource_count(), 3);
    }

    #[test]
    fn test_summary_record() {
        let mut summary = RunSummary::default();
        summary.record(&FetchOutcome::Skipped { path: PathBuf::from("a") });
        summary.record(&FetchOutcome::Downloaded { path: PathBuf::from("b"), bytes: 3 });
        summary.record(&FetchOutcome::Failed { reason: "HTTP 404".to_string() });
        summary.record(&FetchOutcome::Failed { reason: "timeout".to_string() });

        assert_eq!(summary, RunSummary { downloaded: 1, skipped: 1, failed: 2 });
        assert_eq!(summary.total(), 4);
    }
}
