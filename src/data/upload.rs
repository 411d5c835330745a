use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use super::{MetricsRow, MetricsTable};
use crate::error::DataError;
use crate::scoring::{expected_headers, MetricColumn, COUNTRY_COLUMN};

/// Cell spellings read as "no value", compared case-insensitively
const MISSING_MARKERS: [&str; 5] = ["", "nan", "na", "null", "none"];

/// An uploaded table before validation: headers and cells as text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read and validate an uploaded CSV file.
pub fn load_upload(path: &Path) -> Result<MetricsTable, DataError> {
    let bytes = fs::read(path)
        .map_err(|e| DataError::UnreadableFile(format!("{}: {}", path.display(), e)))?;
    parse_upload(&bytes)
}

/// Parse CSV bytes into a [`RawTable`] and validate it.
pub fn parse_upload(bytes: &[u8]) -> Result<MetricsTable, DataError> {
    let raw = read_csv(bytes)?;
    validate_table(&raw)
}

fn read_csv(bytes: &[u8]) -> Result<RawTable, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| DataError::UnreadableFile(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DataError::UnreadableFile(e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

/// Validate a raw table against the expected header set.
///
/// Rules run in a fixed order and the first failure is returned: header set,
/// row shape, then missing values, duplicate countries, the `[0, 1]` range,
/// then row count. Cells that do not parse as numbers count as missing.
pub fn validate_table(raw: &RawTable) -> Result<MetricsTable, DataError> {
    check_headers(&raw.headers)?;

    // A row wider than the header is not a delimited table we can trust;
    // short rows fall through to the missing-value rule
    if let Some((row, cells)) = raw
        .rows
        .iter()
        .enumerate()
        .find(|(_, cells)| cells.len() > raw.headers.len())
    {
        return Err(DataError::UnreadableFile(format!(
            "row {} has {} cells, expected at most {}",
            row + 1,
            cells.len(),
            raw.headers.len()
        )));
    }

    let index: HashMap<&str, usize> = raw
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();
    let country_idx = index.get(COUNTRY_COLUMN).copied().unwrap_or(0);

    // Parse every cell up front so each rule sees the whole table
    let parsed: Vec<(String, Vec<(MetricColumn, Option<f64>)>)> = raw
        .rows
        .iter()
        .map(|cells| {
            let country = cells.get(country_idx).cloned().unwrap_or_default();
            let values = MetricColumn::ALL
                .into_iter()
                .map(|column| {
                    let value = index
                        .get(column.header())
                        .and_then(|&i| cells.get(i))
                        .and_then(|cell| parse_cell(cell));
                    (column, value)
                })
                .collect();
            (country, values)
        })
        .collect();

    for (row, (country, values)) in parsed.iter().enumerate() {
        if is_missing(country) {
            return Err(DataError::MissingValues {
                column: COUNTRY_COLUMN.to_string(),
                row: row + 1,
            });
        }
        if let Some((column, _)) = values.iter().find(|(_, v)| v.is_none()) {
            return Err(DataError::MissingValues {
                column: column.header().to_string(),
                row: row + 1,
            });
        }
    }

    let mut countries = HashSet::new();
    for (row, (country, _)) in parsed.iter().enumerate() {
        if !countries.insert(country.as_str()) {
            return Err(DataError::DuplicateCountry {
                country: country.clone(),
                row: row + 1,
            });
        }
    }

    for (row, (_, values)) in parsed.iter().enumerate() {
        for (column, value) in values {
            if let Some(value) = *value {
                if !(0.0..=1.0).contains(&value) {
                    return Err(DataError::OutOfRangeValue {
                        column: column.header().to_string(),
                        row: row + 1,
                        value,
                    });
                }
            }
        }
    }

    if parsed.is_empty() {
        return Err(DataError::EmptyTable);
    }

    let rows = parsed
        .into_iter()
        .map(|(country, values)| {
            values
                .into_iter()
                .fold(MetricsRow::new(country), |row, (column, value)| match value {
                    Some(v) => row.with(column, v),
                    None => row,
                })
        })
        .collect();

    Ok(MetricsTable::new(rows))
}

/// Compare headers against the expected set: no missing, no extra, no
/// duplicates. Order does not matter.
fn check_headers(headers: &[String]) -> Result<(), DataError> {
    let expected = expected_headers();

    let missing: Vec<String> = expected
        .iter()
        .filter(|e| !headers.iter().any(|h| h == *e))
        .map(|e| e.to_string())
        .collect();

    let mut seen: Vec<&str> = Vec::new();
    let mut unexpected = Vec::new();
    for header in headers {
        if !expected.contains(&header.as_str()) || seen.contains(&header.as_str()) {
            unexpected.push(header.clone());
        }
        seen.push(header.as_str());
    }

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(DataError::SchemaMismatch {
            missing,
            unexpected,
        })
    }
}

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    MISSING_MARKERS.iter().any(|m| cell.eq_ignore_ascii_case(m))
}

fn parse_cell(cell: &str) -> Option<f64> {
    if is_missing(cell) {
        return None;
    }
    cell.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_line() -> String {
        expected_headers().join(",")
    }

    fn csv(lines: &[&str]) -> Vec<u8> {
        let mut text = header_line();
        for line in lines {
            text.push('\n');
            text.push_str(line);
        }
        text.into_bytes()
    }

    #[test]
    fn test_accepts_valid_table() {
        let table = parse_upload(&csv(&[
            "USA,1,1,1,0.8,0.7,0.6,0.64,0.62,0.33",
            "Kenya,0.01,0.02,0.1,0.45,0.37,0.51,0.34,0.72,0.64",
        ]))
        .unwrap();

        assert_eq!(table.len(), 2);
        let kenya = &table.rows()[1];
        assert_eq!(kenya.country, "Kenya");
        assert_eq!(kenya.get(MetricColumn::WillingnessMedical), Some(0.37));
        assert_eq!(kenya.get(MetricColumn::Seasonality), Some(0.64));
    }

    #[test]
    fn test_accepts_reordered_columns_and_whitespace() {
        let mut headers = expected_headers();
        headers.reverse();
        let text = format!(
            "{}\n 0.33 , 0.62,0.64,0.6,0.7,0.8,1,1,1 , USA ",
            headers.join(" , ")
        );
        let table = parse_upload(text.as_bytes()).unwrap();
        let usa = &table.rows()[0];
        assert_eq!(usa.country, "USA");
        assert_eq!(usa.get(MetricColumn::Seasonality), Some(0.33));
        assert_eq!(usa.get(MetricColumn::MarketSizeSecurity), Some(1.0));
    }

    #[test]
    fn test_rejects_missing_column() {
        let headers: Vec<_> = expected_headers()
            .into_iter()
            .filter(|h| *h != "Seasonality")
            .collect();
        let text = format!("{}\nUSA,1,1,1,0.8,0.7,0.6,0.64,0.62", headers.join(","));

        let err = parse_upload(text.as_bytes()).unwrap_err();
        assert_eq!(err.reason(), "schema mismatch");
        assert_eq!(
            err,
            DataError::SchemaMismatch {
                missing: vec!["Seasonality".to_string()],
                unexpected: vec![],
            }
        );
    }

    #[test]
    fn test_rejects_extra_and_duplicate_columns() {
        let text = format!("{},Population,Seasonality\n", header_line());
        let err = parse_upload(text.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            DataError::SchemaMismatch {
                missing: vec![],
                unexpected: vec!["Population".to_string(), "Seasonality".to_string()],
            }
        );
    }

    #[test]
    fn test_rejects_out_of_range_value() {
        let err = parse_upload(&csv(&["USA,1,1,1,0.8,0.7,0.6,0.64,1.5,0.33"])).unwrap_err();
        assert_eq!(err.reason(), "out of range");
        assert_eq!(
            err,
            DataError::OutOfRangeValue {
                column: "Tariff & Shipping".to_string(),
                row: 1,
                value: 1.5,
            }
        );
    }

    #[test]
    fn test_rejects_negative_value() {
        let err = parse_upload(&csv(&["USA,-0.1,1,1,0.8,0.7,0.6,0.64,0.5,0.33"])).unwrap_err();
        assert_eq!(err.reason(), "out of range");
    }

    #[test]
    fn test_rejects_null_value() {
        let err = parse_upload(&csv(&[
            "USA,1,1,1,0.8,0.7,0.6,0.64,0.62,0.33",
            "UK,0.1,0.17,,1,0.95,0.87,0.85,0.67,0.62",
        ]))
        .unwrap_err();
        assert_eq!(err.reason(), "missing values");
        assert_eq!(
            err,
            DataError::MissingValues {
                column: "Market Size - School".to_string(),
                row: 2,
            }
        );
    }

    #[test]
    fn test_nan_and_text_cells_count_as_missing() {
        let err = parse_upload(&csv(&["USA,NaN,1,1,0.8,0.7,0.6,0.64,0.62,0.33"])).unwrap_err();
        assert_eq!(err.reason(), "missing values");

        let err = parse_upload(&csv(&["USA,high,1,1,0.8,0.7,0.6,0.64,0.62,0.33"])).unwrap_err();
        assert_eq!(err.reason(), "missing values");
    }

    #[test]
    fn test_short_row_counts_as_missing() {
        let err = parse_upload(&csv(&["USA,1,1,1"])).unwrap_err();
        assert_eq!(
            err,
            DataError::MissingValues {
                column: "Willingness - Security".to_string(),
                row: 1,
            }
        );
    }

    #[test]
    fn test_rejects_row_wider_than_header() {
        let err = parse_upload(&csv(&[
            "USA,1,1,1,0.8,0.7,0.6,0.64,0.62,0.33,99,garbage",
        ]))
        .unwrap_err();
        assert_eq!(err.reason(), "unreadable file");
        assert!(err.to_string().contains("row 1 has 12 cells, expected at most 10"));
    }

    #[test]
    fn test_rejects_duplicate_country() {
        let err = parse_upload(&csv(&[
            "USA,1,1,1,0.8,0.7,0.6,0.64,0.62,0.33",
            "UK,0.1,0.17,0.14,1,0.95,0.87,0.85,0.67,0.62",
            "USA,0.5,0.5,0.5,0.5,0.5,0.5,0.5,0.5,0.5",
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            DataError::DuplicateCountry {
                country: "USA".to_string(),
                row: 3,
            }
        );
        assert_eq!(err.reason(), "duplicate country");
    }

    #[test]
    fn test_missing_country_name() {
        let err = parse_upload(&csv(&[",1,1,1,0.8,0.7,0.6,0.64,0.62,0.33"])).unwrap_err();
        assert_eq!(
            err,
            DataError::MissingValues {
                column: "Country".to_string(),
                row: 1,
            }
        );
    }

    #[test]
    fn test_rejects_empty_table() {
        let err = parse_upload(header_line().as_bytes()).unwrap_err();
        assert_eq!(err, DataError::EmptyTable);
        assert_eq!(err.reason(), "empty");
    }

    #[test]
    fn test_missing_values_win_over_out_of_range() {
        // Row 1 is out of range, row 2 has a gap: the missing-value rule runs first
        let err = parse_upload(&csv(&[
            "USA,2,1,1,0.8,0.7,0.6,0.64,0.62,0.33",
            "UK,0.1,0.17,0.14,1,0.95,0.87,0.85,0.67,",
        ]))
        .unwrap_err();
        assert_eq!(err.reason(), "missing values");
    }

    #[test]
    fn test_schema_wins_over_empty() {
        let err = parse_upload(b"Country,Score\n").unwrap_err();
        assert_eq!(err.reason(), "schema mismatch");
    }

    #[test]
    fn test_unreadable_file() {
        let path = std::env::temp_dir().join("expansion_score_missing_upload.csv");
        let _ = std::fs::remove_file(&path);
        let err = load_upload(&path).unwrap_err();
        assert_eq!(err.reason(), "unreadable file");
    }

    #[test]
    fn test_non_utf8_bytes_are_unreadable() {
        let mut bytes = csv(&[]);
        bytes.extend_from_slice(b"\nUSA,\xff\xfe,1,1,0.8,0.7,0.6,0.64,0.62,0.33");
        let err = parse_upload(&bytes).unwrap_err();
        assert_eq!(err.reason(), "unreadable file");
    }

    #[test]
    fn test_validate_raw_table_directly() {
        let raw = RawTable {
            headers: expected_headers().into_iter().map(String::from).collect(),
            rows: vec![],
        };
        assert_eq!(validate_table(&raw).unwrap_err(), DataError::EmptyTable);
    }
}
