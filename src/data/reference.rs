use super::{MetricsRow, MetricsTable};
use crate::scoring::MetricColumn;

/// Built-in metrics, one row per country. Values follow `MetricColumn::ALL`
/// order and are already scaled to `[0, 1]`.
const REFERENCE_ROWS: [(&str, [f64; 9]); 12] = [
    ("USA", [1.0, 1.0, 1.0, 0.80, 0.74, 0.69, 0.64, 0.62, 0.33]),
    ("UK", [0.1, 0.17, 0.14, 1.0, 0.95, 0.87, 0.85, 0.67, 0.62]),
    ("Denmark", [0.004, 0.012, 0.011, 0.88, 0.91, 0.84, 0.52, 0.59, 0.39]),
    ("Netherlands", [0.0428, 0.036, 0.032, 0.79, 0.82, 0.77, 0.50, 0.59, 0.38]),
    ("Germany", [0.4, 0.26, 0.21, 0.76, 0.79, 0.72, 0.80, 0.59, 0.40]),
    ("France", [0.0933, 0.19, 0.16, 0.83, 0.77, 0.70, 0.67, 0.61, 0.38]),
    ("South Africa", [0.0333, 0.021, 0.095, 0.33, 0.29, 0.41, 0.63, 0.63, 0.66]),
    ("Botswana", [0.0007, 0.0009, 0.004, 0.43, 0.35, 0.46, 0.39, 0.33, 0.66]),
    ("Nigeria", [0.0023, 0.014, 0.31, 0.42, 0.31, 0.48, 0.32, 0.67, 0.69]),
    ("Kenya", [0.0127, 0.009, 0.12, 0.45, 0.37, 0.51, 0.34, 0.72, 0.64]),
    ("Bahamas", [0.0002, 0.0004, 0.0008, 0.78, 0.66, 0.58, 0.41, 0.53, 0.63]),
    ("Guyana", [0.0004, 0.0006, 0.002, 0.45, 0.39, 0.47, 0.40, 0.39, 0.62]),
];

/// The built-in reference table used when no valid upload is selected.
pub fn reference_table() -> MetricsTable {
    let rows = REFERENCE_ROWS
        .iter()
        .map(|(country, values)| {
            MetricColumn::ALL
                .into_iter()
                .zip(values.iter())
                .fold(MetricsRow::new(*country), |row, (column, value)| {
                    row.with(column, *value)
                })
        })
        .collect();
    MetricsTable::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values_in_unit_range() {
        let table = reference_table();
        for row in table.rows() {
            for column in MetricColumn::ALL {
                let value = row.get(column).unwrap();
                assert!((0.0..=1.0).contains(&value), "{} {:?}", row.country, column);
            }
        }
    }

    #[test]
    fn test_reference_countries_unique() {
        let table = reference_table();
        let mut names: Vec<_> = table.rows().iter().map(|r| r.country.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), table.len());
    }

    #[test]
    fn test_usa_security_metrics() {
        let table = reference_table();
        let usa = &table.rows()[0];
        assert_eq!(usa.country, "USA");
        assert_eq!(usa.get(MetricColumn::MarketSizeSecurity), Some(1.0));
        assert_eq!(usa.get(MetricColumn::WillingnessSecurity), Some(0.80));
        assert_eq!(usa.get(MetricColumn::SustainabilityCustomization), Some(0.64));
        assert_eq!(usa.get(MetricColumn::TariffShipping), Some(0.62));
    }
}
