mod reference;
pub mod upload;

pub use reference::reference_table;
pub use upload::{load_upload, parse_upload, validate_table, RawTable};

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::DataError;
use crate::log_warn;
use crate::scoring::MetricColumn;

/// One country's raw metric values, each in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub country: String,
    values: BTreeMap<MetricColumn, f64>,
}

impl MetricsRow {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, column: MetricColumn, value: f64) -> Self {
        self.values.insert(column, value);
        self
    }

    pub fn get(&self, column: MetricColumn) -> Option<f64> {
        self.values.get(&column).copied()
    }
}

/// Metrics for every country, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsTable {
    rows: Vec<MetricsRow>,
}

impl MetricsTable {
    pub fn new(rows: Vec<MetricsRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[MetricsRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Where the metrics table comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DataSource {
    #[default]
    BuiltIn,
    Upload(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::BuiltIn => f.write_str("built-in"),
            DataSource::Upload(path) => write!(f, "upload ({})", path.display()),
        }
    }
}

/// Table actually in use after resolving a [`DataSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedData {
    pub table: MetricsTable,
    /// Source the table really came from; `BuiltIn` after a fallback
    pub source: DataSource,
    /// Why the requested upload was not used, if it was rejected
    pub rejected: Option<DataError>,
}

impl LoadedData {
    pub fn built_in() -> Self {
        Self {
            table: reference_table(),
            source: DataSource::BuiltIn,
            rejected: None,
        }
    }
}

/// Resolve a data source to a table.
///
/// A rejected upload never propagates: the built-in table is returned with
/// the rejection attached so the caller can tell the user.
pub fn load(source: &DataSource) -> LoadedData {
    match source {
        DataSource::BuiltIn => LoadedData::built_in(),
        DataSource::Upload(path) => match load_upload(path) {
            Ok(table) => {
                crate::log_debug!("Loaded {} rows from {}", table.len(), path.display());
                LoadedData {
                    table,
                    source: source.clone(),
                    rejected: None,
                }
            }
            Err(e) => {
                log_warn!(
                    "Upload {} rejected ({}), using built-in data: {}",
                    path.display(),
                    e.reason(),
                    e
                );
                LoadedData {
                    rejected: Some(e),
                    ..LoadedData::built_in()
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_built_in() {
        let loaded = load(&DataSource::BuiltIn);
        assert_eq!(loaded.source, DataSource::BuiltIn);
        assert_eq!(loaded.table.len(), 12);
        assert!(loaded.rejected.is_none());
    }

    #[test]
    fn test_load_missing_upload_falls_back() {
        let path = std::env::temp_dir().join("expansion_score_does_not_exist.csv");
        let _ = std::fs::remove_file(&path);

        let loaded = load(&DataSource::Upload(path));
        assert_eq!(loaded.source, DataSource::BuiltIn);
        assert_eq!(loaded.table, reference_table());
        assert!(matches!(loaded.rejected, Some(DataError::UnreadableFile(_))));
    }

    #[test]
    fn test_load_valid_upload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", crate::scoring::expected_headers().join(",")).unwrap();
        writeln!(file, "Iceland,0.1,0.2,0.3,0.4,0.5,0.6,0.7,0.8,0.9").unwrap();

        let source = DataSource::Upload(file.path().to_path_buf());
        let loaded = load(&source);
        assert_eq!(loaded.source, source);
        assert_eq!(loaded.table.len(), 1);
        assert_eq!(loaded.table.rows()[0].country, "Iceland");
    }

    #[test]
    fn test_data_source_display() {
        assert_eq!(DataSource::BuiltIn.to_string(), "built-in");
        assert_eq!(
            DataSource::Upload(PathBuf::from("m.csv")).to_string(),
            "upload (m.csv)"
        );
    }
}
