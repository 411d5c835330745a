use super::columns::column_for;
use super::factors::{Factor, MarketType};
use super::weights::{normalize, NormalizedWeights, RawWeights};
use crate::data::{MetricsRow, MetricsTable};
use crate::error::ScoreError;

/// Decimal places applied to scores unless configured otherwise
pub const DEFAULT_PRECISION: u32 = 1;

/// Most decimal places a config may ask for
pub const MAX_PRECISION: u32 = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct FactorContribution {
    pub factor: Factor,
    pub weight: u32,     // Normalized weight
    pub raw: f64,        // Metric value read from the table
    pub contribution: f64, // weight * raw
}

/// Per-country decomposition of the final score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub country: String,
    pub contributions: Vec<FactorContribution>,
    pub final_score: f64,
}

impl ScoreBreakdown {
    pub fn contribution(&self, factor: Factor) -> Option<f64> {
        self.contributions
            .iter()
            .find(|c| c.factor == factor)
            .map(|c| c.contribution)
    }
}

/// Output of one full recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub market: MarketType,
    pub weights: NormalizedWeights,
    pub precision: u32,
    pub rows: Vec<ScoreBreakdown>,
}

impl ScoreResult {
    /// Factors with a column in this result, in display order
    pub fn factors(&self) -> Vec<Factor> {
        self.weights.factors().collect()
    }
}

/// Normalize `raw` for `market` and score every row of `table`.
///
/// Pure: the same inputs always give the same result, and nothing is kept
/// between calls.
pub fn compute(
    raw: &RawWeights,
    market: MarketType,
    table: &MetricsTable,
    precision: u32,
) -> Result<ScoreResult, ScoreError> {
    let weights = normalize(raw, market);
    let rows = aggregate(&weights, market, table, precision)?;
    Ok(ScoreResult {
        market,
        weights,
        precision,
        rows,
    })
}

/// Score every row with already-normalized weights, rounding the output.
/// Rows come back in table order.
pub fn aggregate(
    weights: &NormalizedWeights,
    market: MarketType,
    table: &MetricsTable,
    precision: u32,
) -> Result<Vec<ScoreBreakdown>, ScoreError> {
    table
        .rows()
        .iter()
        .map(|row| score_row(weights, market, row).map(|b| round_breakdown(b, precision)))
        .collect()
}

/// Unrounded breakdown for a single row.
///
/// Only factors present in `weights` contribute, so an inactive factor has
/// no column here.
pub fn score_row(
    weights: &NormalizedWeights,
    market: MarketType,
    row: &MetricsRow,
) -> Result<ScoreBreakdown, ScoreError> {
    let mut contributions = Vec::with_capacity(weights.len());

    for (factor, weight) in weights.iter() {
        let column = column_for(factor, market);
        let raw = row.get(column).ok_or_else(|| ScoreError::MissingColumn {
            country: row.country.clone(),
            column: column.header(),
            factor: factor.label(),
            market: market.label(),
        })?;
        contributions.push(FactorContribution {
            factor,
            weight,
            raw,
            contribution: f64::from(weight) * raw,
        });
    }

    let final_score = contributions.iter().map(|c| c.contribution).sum();

    Ok(ScoreBreakdown {
        country: row.country.clone(),
        contributions,
        final_score,
    })
}

/// Round contributions and the final score for display. The final score is
/// summed before rounding, so it may differ from the sum of rounded parts.
fn round_breakdown(mut breakdown: ScoreBreakdown, precision: u32) -> ScoreBreakdown {
    for c in &mut breakdown.contributions {
        c.contribution = round_to(c.contribution, precision);
    }
    breakdown.final_score = round_to(breakdown.final_score, precision);
    breakdown
}

/// Round half to even at `precision` decimal places.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10_f64.powi(precision.min(MAX_PRECISION) as i32);
    (value * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference_table;
    use crate::scoring::MetricColumn;

    fn example_weights() -> RawWeights {
        RawWeights::zeroed()
            .with(Factor::MarketSize, 30)
            .with(Factor::TariffShipping, 20)
            .with(Factor::Willingness, 30)
            .with(Factor::SustainabilityCustomization, 10)
            .with(Factor::Seasonality, 10)
    }

    fn sample_row() -> MetricsRow {
        MetricsRow::new("USA")
            .with(MetricColumn::MarketSizeSecurity, 1.0)
            .with(MetricColumn::MarketSizeMedical, 0.5)
            .with(MetricColumn::MarketSizeSchool, 0.25)
            .with(MetricColumn::WillingnessSecurity, 0.8)
            .with(MetricColumn::WillingnessMedical, 0.4)
            .with(MetricColumn::WillingnessSchool, 0.2)
            .with(MetricColumn::SustainabilityCustomization, 0.64)
            .with(MetricColumn::TariffShipping, 0.62)
            .with(MetricColumn::Seasonality, 0.5)
    }

    #[test]
    fn test_end_to_end_security_example() {
        let table = MetricsTable::new(vec![sample_row()]);
        let result = compute(&example_weights(), MarketType::Security, &table, 1).unwrap();

        let usa = &result.rows[0];
        assert_eq!(usa.country, "USA");
        assert_eq!(usa.contribution(Factor::MarketSize), Some(33.0));
        assert_eq!(usa.contribution(Factor::Willingness), Some(26.4));
        assert_eq!(usa.contribution(Factor::SustainabilityCustomization), Some(7.0));
        assert_eq!(usa.contribution(Factor::TariffShipping), Some(13.6));
        assert_eq!(usa.contribution(Factor::Seasonality), None);
        // 33*1 + 33*0.8 + 11*0.64 + 22*0.62 = 80.08
        assert_eq!(usa.final_score, 80.1);
    }

    #[test]
    fn test_market_type_selects_columns() {
        let table = MetricsTable::new(vec![sample_row()]);
        let result = compute(&example_weights(), MarketType::Medical, &table, 3).unwrap();
        let usa = &result.rows[0];

        // Medical columns: market size 0.5, willingness 0.4
        assert_eq!(usa.contribution(Factor::MarketSize), Some(16.5));
        assert_eq!(usa.contribution(Factor::Willingness), Some(13.2));
    }

    #[test]
    fn test_school_includes_seasonality() {
        let table = MetricsTable::new(vec![sample_row()]);
        let result = compute(&example_weights(), MarketType::School, &table, 1).unwrap();
        let usa = &result.rows[0];

        assert_eq!(result.factors().len(), 5);
        assert_eq!(usa.contribution(Factor::Seasonality), Some(5.0));
        // 30*0.25 + 20*0.62 + 30*0.2 + 10*0.64 + 10*0.5 = 37.3
        assert_eq!(usa.final_score, 37.3);
    }

    #[test]
    fn test_excluding_seasonality_removes_column() {
        let table = reference_table();
        let result = compute(&example_weights(), MarketType::Security, &table, 1).unwrap();
        assert!(!result.factors().contains(&Factor::Seasonality));
        for row in &result.rows {
            assert_eq!(row.contributions.len(), 4);
            assert!(row.contribution(Factor::Seasonality).is_none());
        }
    }

    #[test]
    fn test_linear_in_weights() {
        let row = sample_row();
        let weights: NormalizedWeights = [
            (Factor::MarketSize, 25),
            (Factor::TariffShipping, 15),
            (Factor::Willingness, 40),
            (Factor::SustainabilityCustomization, 20),
        ]
        .into_iter()
        .collect();
        let doubled: NormalizedWeights = weights.iter().map(|(f, w)| (f, w * 2)).collect();

        let single = score_row(&weights, MarketType::Security, &row).unwrap();
        let double = score_row(&doubled, MarketType::Security, &row).unwrap();

        for (a, b) in single.contributions.iter().zip(&double.contributions) {
            assert_eq!(b.contribution, a.contribution * 2.0);
        }
        assert!((double.final_score - single.final_score * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let table = reference_table();
        for market in MarketType::ALL {
            let a = compute(&example_weights(), market, &table, 1).unwrap();
            let b = compute(&example_weights(), market, &table, 1).unwrap();
            assert_eq!(a, b);
            for (x, y) in a.rows.iter().zip(&b.rows) {
                assert_eq!(x.final_score.to_bits(), y.final_score.to_bits());
            }
        }
    }

    #[test]
    fn test_rows_keep_table_order() {
        let table = reference_table();
        let result = compute(&RawWeights::default(), MarketType::Security, &table, 1).unwrap();
        let countries: Vec<_> = result.rows.iter().map(|r| r.country.as_str()).collect();
        let expected: Vec<_> = table.rows().iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, expected);
    }

    #[test]
    fn test_missing_column_error() {
        let row = MetricsRow::new("Atlantis")
            .with(MetricColumn::MarketSizeSecurity, 0.3)
            .with(MetricColumn::TariffShipping, 0.3)
            .with(MetricColumn::SustainabilityCustomization, 0.3);
        let table = MetricsTable::new(vec![row]);

        let err = compute(&example_weights(), MarketType::Security, &table, 1).unwrap_err();
        assert_eq!(
            err,
            ScoreError::MissingColumn {
                country: "Atlantis".to_string(),
                column: "Willingness - Security",
                factor: "Willingness",
                market: "Security",
            }
        );
    }

    #[test]
    fn test_zero_weights_still_score() {
        let table = MetricsTable::new(vec![sample_row()]);
        let result = compute(&RawWeights::zeroed(), MarketType::Security, &table, 2).unwrap();
        // Equal split: 25 each over 1.0, 0.62, 0.8, 0.64
        assert_eq!(result.rows[0].final_score, 76.5);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(80.08, 1), 80.1);
        assert_eq!(round_to(7.04, 1), 7.0);
        assert_eq!(round_to(13.6449, 3), 13.645);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
    }

    #[test]
    fn test_empty_table() {
        let result = compute(&RawWeights::default(), MarketType::School, &MetricsTable::default(), 1)
            .unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.weights.total(), 100);
    }
}
