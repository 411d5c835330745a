use super::factors::{Factor, MarketType};
use crate::data::MetricsTable;
use crate::error::ScoreError;

/// Header of the key column in every metrics table
pub const COUNTRY_COLUMN: &str = "Country";

/// The raw metric columns a metrics table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricColumn {
    MarketSizeSecurity,
    MarketSizeMedical,
    MarketSizeSchool,
    WillingnessSecurity,
    WillingnessMedical,
    WillingnessSchool,
    SustainabilityCustomization,
    TariffShipping,
    Seasonality,
}

impl MetricColumn {
    pub const ALL: [MetricColumn; 9] = [
        MetricColumn::MarketSizeSecurity,
        MetricColumn::MarketSizeMedical,
        MetricColumn::MarketSizeSchool,
        MetricColumn::WillingnessSecurity,
        MetricColumn::WillingnessMedical,
        MetricColumn::WillingnessSchool,
        MetricColumn::SustainabilityCustomization,
        MetricColumn::TariffShipping,
        MetricColumn::Seasonality,
    ];

    /// Exact header text expected in uploaded files
    pub fn header(self) -> &'static str {
        match self {
            MetricColumn::MarketSizeSecurity => "Market Size - Security",
            MetricColumn::MarketSizeMedical => "Market Size - Medical",
            MetricColumn::MarketSizeSchool => "Market Size - School",
            MetricColumn::WillingnessSecurity => "Willingness - Security",
            MetricColumn::WillingnessMedical => "Willingness - Medical",
            MetricColumn::WillingnessSchool => "Willingness - School",
            MetricColumn::SustainabilityCustomization => "Sustainability & Customization",
            MetricColumn::TariffShipping => "Tariff & Shipping",
            MetricColumn::Seasonality => "Seasonality",
        }
    }
}

/// Column that feeds `factor` when scoring for `market`.
///
/// Market size and willingness have one column per market type; the other
/// factors read the same column regardless of market.
pub fn column_for(factor: Factor, market: MarketType) -> MetricColumn {
    match (factor, market) {
        (Factor::MarketSize, MarketType::Security) => MetricColumn::MarketSizeSecurity,
        (Factor::MarketSize, MarketType::Medical) => MetricColumn::MarketSizeMedical,
        (Factor::MarketSize, MarketType::School) => MetricColumn::MarketSizeSchool,
        (Factor::Willingness, MarketType::Security) => MetricColumn::WillingnessSecurity,
        (Factor::Willingness, MarketType::Medical) => MetricColumn::WillingnessMedical,
        (Factor::Willingness, MarketType::School) => MetricColumn::WillingnessSchool,
        (Factor::SustainabilityCustomization, _) => MetricColumn::SustainabilityCustomization,
        (Factor::TariffShipping, _) => MetricColumn::TariffShipping,
        (Factor::Seasonality, _) => MetricColumn::Seasonality,
    }
}

/// Full header set an uploaded file must match: the country column plus
/// every metric column.
pub fn expected_headers() -> Vec<&'static str> {
    std::iter::once(COUNTRY_COLUMN)
        .chain(MetricColumn::ALL.into_iter().map(MetricColumn::header))
        .collect()
}

/// Check that every row carries the column each active factor resolves to,
/// for every market type.
///
/// Run whenever a table is loaded so a lookup gap shows up before the first
/// score is computed.
pub fn validate_lookup(table: &MetricsTable) -> Result<(), ScoreError> {
    for market in MarketType::ALL {
        for factor in Factor::active_for(market) {
            let column = column_for(factor, market);
            if let Some(row) = table.rows().iter().find(|r| r.get(column).is_none()) {
                return Err(ScoreError::MissingColumn {
                    country: row.country.clone(),
                    column: column.header(),
                    factor: factor.label(),
                    market: market.label(),
                });
            }
        }
    }
    Ok(())
}
