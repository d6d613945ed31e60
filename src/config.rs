//! Deploy-time configuration: the built-in resource table, fixed request
//! settings, and loading of an optional YAML table override.

use crate::models::{ResourceGroup, ResourceTable};
use std::error::Error;
use std::path::{Component, Path};
use std::time::Duration;
use tracing::{info, instrument};

/// Storage root used when no `--data-dir` is given.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Identifying header sent with every request. The publisher rejects obvious bots.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const CME_DELIVERY_REPORTS: &str = "https://www.cmegroup.com/delivery_reports";

/// Per-request timeouts for the HTTP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Bound on the metadata-only (HEAD) request.
    pub probe: Duration,
    /// Bound on the full-content (GET) request.
    pub fetch: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe: DEFAULT_PROBE_TIMEOUT,
            fetch: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// The curated CME delivery report table.
///
/// Locator lists are disjoint across groups.
pub fn default_table() -> ResourceTable {
    let reports = |names: &[&str]| -> Vec<String> {
        names
            .iter()
            .map(|name| format!("{}/{}", CME_DELIVERY_REPORTS, name))
            .collect()
    };

    ResourceTable {
        groups: vec![
            ResourceGroup::new(
                "stocks",
                reports(&[
                    "Gold_Stocks.xls",
                    "Silver_stocks.xls",
                    "Copper_Stocks.xls",
                    "PA-PL_Stck_Rprt.xls",
                    "Aluminum_Stocks.xls",
                    "Zinc_Stocks.xls",
                    "Lead_Stocks.xls",
                ]),
            ),
            ResourceGroup::new(
                "notices/metals",
                reports(&[
                    "MetalsIssuesAndStopsReport.pdf",
                    "MetalsIssuesAndStopsMTDReport.pdf",
                    "MetalsIssuesAndStopsYTDReport.pdf",
                ]),
            ),
            ResourceGroup::new(
                "notices/energy",
                reports(&[
                    "EnergiesIssuesAndStopsReport.pdf",
                    "EnergiesIssuesAndStopsYTDReport.pdf",
                ]),
            ),
        ],
    }
}

/// Parse and validate a YAML resource table.
pub fn parse_table(yaml: &str) -> Result<ResourceTable, Box<dyn Error>> {
    let table: ResourceTable = serde_yaml::from_str(yaml)?;
    validate_table(&table)?;
    Ok(table)
}

/// Load the resource table from `path`, or return the built-in table.
#[instrument(level = "info")]
pub async fn load_table(path: Option<&Path>) -> Result<ResourceTable, Box<dyn Error>> {
    let Some(path) = path else {
        let table = default_table();
        info!(groups = table.groups.len(), resources = table.resource_count(), "Using built-in resource table");
        return Ok(table);
    };

    let yaml = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("cannot read resource table {}: {}", path.display(), e))?;
    let table = parse_table(&yaml)
        .map_err(|e| format!("invalid resource table {}: {}", path.display(), e))?;
    info!(groups = table.groups.len(), resources = table.resource_count(), "Loaded resource table");
    Ok(table)
}

/// Reject groups that could write outside the storage root.
fn validate_table(table: &ResourceTable) -> Result<(), Box<dyn Error>> {
    for group in &table.groups {
        if group.category.trim().is_empty() {
            return Err("resource group with an empty category".into());
        }
        let subdir = Path::new(group.subdir());
        let escapes = subdir
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(format!(
                "subdirectory {:?} of category {:?} must be a relative path inside the storage root",
                group.subdir(),
                group.category
            )
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_shape() {
        let table = default_table();
        let categories: Vec<&str> = table.groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, ["stocks", "notices/metals", "notices/energy"]);
        assert_eq!(table.resource_count(), 12);
        assert_eq!(
            table.groups[0].urls[0],
            "https://www.cmegroup.com/delivery_reports/Gold_Stocks.xls"
        );
        assert!(validate_table(&table).is_ok());
    }

    #[test]
    fn test_parse_table_yaml() {
        let yaml = r#"
groups:
  - category: stocks
    urls:
      - https://example.com/reports/Gold_Stocks.xls
  - category: metals
    subdir: notices/metals
    urls:
      - https://example.com/reports/Metals.pdf
      - https://example.com/reports/MetalsYTD.pdf
"#;
        let table = parse_table(yaml).unwrap();
        assert_eq!(table.groups.len(), 2);
        assert_eq!(table.groups[0].subdir(), "stocks");
        assert_eq!(table.groups[1].subdir(), "notices/metals");
        assert_eq!(table.groups[1].urls.len(), 2);
    }

    #[test]
    fn test_example_table_parses() {
        let table = parse_table(include_str!("../reports.example.yaml")).unwrap();
        assert_eq!(table.groups.len(), 3);
        assert_eq!(table.groups[2].category, "energy notices");
        assert_eq!(table.groups[2].subdir(), "notices/energy");
    }

    #[test]
    fn test_parse_table_rejects_escaping_subdir() {
        let yaml = "groups:\n  - category: x\n    subdir: ../outside\n    urls: []\n";
        assert!(parse_table(yaml).is_err());

        let yaml = "groups:\n  - category: x\n    subdir: /etc\n    urls: []\n";
        assert!(parse_table(yaml).is_err());
    }

    #[test]
    fn test_parse_table_rejects_empty_category() {
        let yaml = "groups:\n  - category: \"  \"\n    urls: []\n";
        assert!(parse_table(yaml).is_err());
    }

    #[tokio::test]
    async fn test_load_table_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.yaml");
        std::fs::write(&path, "groups:\n  - category: energy\n    urls: [https://example.com/e.pdf]\n").unwrap();

        let table = load_table(Some(&path)).await.unwrap();
        assert_eq!(table.groups[0].category, "energy");

        let missing = dir.path().join("missing.yaml");
        assert!(load_table(Some(&missing)).await.is_err());
        assert_eq!(load_table(None).await.unwrap(), default_table());
    }
}
