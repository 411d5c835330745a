use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use super::chart::{LongFormRow, StackedBarChart};
use crate::scoring::ScoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// `.csv` files get CSV; everything else gets JSON
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    generated_at: DateTime<Utc>,
    market_type: &'a str,
    data_source: String,
    precision: u32,
    weights: BTreeMap<&'static str, u32>,
    rows: Vec<ExportRow<'a>>,
    chart: StackedBarChart,
    /// One entry per (country, factor), in chart order
    long_form: Vec<LongFormRow>,
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    country: &'a str,
    contributions: BTreeMap<&'static str, f64>,
    final_score: f64,
}

/// Build the JSON document for a result.
pub fn to_json(result: &ScoreResult, data_source: &str) -> Result<String> {
    let chart = StackedBarChart::from_result(result);
    let document = ExportDocument {
        generated_at: Utc::now(),
        market_type: result.market.label(),
        data_source: data_source.to_string(),
        precision: result.precision,
        weights: result.weights.iter().map(|(f, w)| (f.label(), w)).collect(),
        rows: result
            .rows
            .iter()
            .map(|row| ExportRow {
                country: &row.country,
                contributions: row
                    .contributions
                    .iter()
                    .map(|c| (c.factor.label(), c.contribution))
                    .collect(),
                final_score: row.final_score,
            })
            .collect(),
        long_form: chart.long_form(),
        chart,
    };
    serde_json::to_string_pretty(&document).context("Failed to serialize export")
}

/// Build the CSV breakdown for a result: Country, one column per active
/// factor, Final Score.
pub fn to_csv(result: &ScoreResult) -> Result<String> {
    let factors = result.factors();
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Country"];
    header.extend(factors.iter().map(|f| f.label()));
    header.push("Final Score");
    writer.write_record(&header).context("Failed to write CSV header")?;

    for row in &result.rows {
        let mut record = vec![row.country.clone()];
        record.extend(
            factors
                .iter()
                .map(|f| row.contribution(*f).map(|v| v.to_string()).unwrap_or_default()),
        );
        record.push(row.final_score.to_string());
        writer.write_record(&record).context("Failed to write CSV row")?;
    }

    let bytes = writer.into_inner().context("Failed to finish CSV output")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Write `result` to `path` atomically, in the format its extension asks for.
pub fn export_result(path: &Path, result: &ScoreResult, data_source: &str) -> Result<ExportFormat> {
    let format = ExportFormat::for_path(path);
    let content = match format {
        ExportFormat::Json => to_json(result, data_source)?,
        ExportFormat::Csv => to_csv(result)?,
    };

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    file.commit().context("Failed to save export")?;

    crate::log_debug!("Exported {} rows to {}", result.rows.len(), path.display());
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference_table;
    use crate::scoring::{compute, MarketType, RawWeights};
    use std::path::PathBuf;

    fn result() -> ScoreResult {
        compute(&RawWeights::default(), MarketType::School, &reference_table(), 1).unwrap()
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(ExportFormat::for_path(&PathBuf::from("out.CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::for_path(&PathBuf::from("out.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::for_path(&PathBuf::from("out")), ExportFormat::Json);
    }

    #[test]
    fn test_csv_export_shape() {
        let csv = to_csv(&result()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[0].starts_with("Country,Market Size,"));
        assert!(lines[0].ends_with("Seasonality,Final Score"));
        assert!(lines[1].starts_with("USA,"));
    }

    #[test]
    fn test_json_export_contents() {
        let json = to_json(&result(), "built-in").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["market_type"], "School");
        assert_eq!(value["data_source"], "built-in");
        assert_eq!(value["weights"]["Seasonality"], 10);
        assert_eq!(value["rows"].as_array().unwrap().len(), 12);
        assert_eq!(value["chart"]["bars"].as_array().unwrap().len(), 12);
        // 12 countries x 5 active factors
        assert_eq!(value["long_form"].as_array().unwrap().len(), 60);
        assert_eq!(value["long_form"][0]["factor"], "Market Size");
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let format = export_result(&path, &result(), "built-in").unwrap();
        assert_eq!(format, ExportFormat::Csv);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Final Score"));
    }
}
