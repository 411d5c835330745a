use thiserror::Error;

/// Reasons an uploaded metrics table is rejected.
///
/// Every variant is recoverable: callers fall back to the built-in table and
/// show the message to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("schema mismatch: {}", describe_columns(.missing, .unexpected))]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("missing values: '{column}' has no value in row {row}")]
    MissingValues { column: String, row: usize },

    #[error("out of range: '{column}' in row {row} is {value}, expected a value between 0 and 1")]
    OutOfRangeValue {
        column: String,
        row: usize,
        value: f64,
    },

    #[error("duplicate country: '{country}' appears again in row {row}")]
    DuplicateCountry { country: String, row: usize },

    #[error("empty: the file has a header but no data rows")]
    EmptyTable,

    #[error("unreadable file: {0}")]
    UnreadableFile(String),
}

impl DataError {
    /// Short reason label shown next to the fallback notice
    pub fn reason(&self) -> &'static str {
        match self {
            DataError::SchemaMismatch { .. } => "schema mismatch",
            DataError::MissingValues { .. } => "missing values",
            DataError::OutOfRangeValue { .. } => "out of range",
            DataError::DuplicateCountry { .. } => "duplicate country",
            DataError::EmptyTable => "empty",
            DataError::UnreadableFile(_) => "unreadable file",
        }
    }
}

fn describe_columns(missing: &[String], unexpected: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing [{}]", missing.join(", ")));
    }
    if !unexpected.is_empty() {
        parts.push(format!("unexpected [{}]", unexpected.join(", ")));
    }
    parts.join("; ")
}

/// Aggregation failures. These mean the market-type lookup and the loaded
/// table disagree, which validation should have prevented.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("missing column '{column}' for {country} ({factor}, {market} market)")]
    MissingColumn {
        country: String,
        column: &'static str,
        factor: &'static str,
        market: &'static str,
    },
}
