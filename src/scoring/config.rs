use serde::{Deserialize, Serialize};

use super::engine::DEFAULT_PRECISION;
use super::factors::Factor;
use super::weights::RawWeights;

/// Scoring section of the config file.
///
/// Weights left out fall back to the factor defaults, so a config only needs
/// to mention what it changes.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   precision: 1
///   weights:
///     market_size: 40
///     seasonality: 0
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Starting slider positions (0-100 each)
    #[serde(default)]
    pub weights: Option<WeightConfig>,

    /// Decimal places for displayed scores (default: 1)
    #[serde(default)]
    pub precision: Option<u32>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: Some(WeightConfig::from_raw(&RawWeights::default())),
            precision: Some(DEFAULT_PRECISION),
        }
    }
}

impl ScoringConfig {
    pub fn raw_weights(&self) -> RawWeights {
        self.weights
            .as_ref()
            .map(WeightConfig::to_raw)
            .unwrap_or_default()
    }

    pub fn precision(&self) -> u32 {
        self.precision.unwrap_or(DEFAULT_PRECISION)
    }
}

/// Per-factor starting weights.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WeightConfig {
    #[serde(default)]
    pub market_size: Option<u32>,
    #[serde(default)]
    pub tariff_shipping: Option<u32>,
    #[serde(default)]
    pub willingness: Option<u32>,
    #[serde(default)]
    pub sustainability_customization: Option<u32>,
    #[serde(default)]
    pub seasonality: Option<u32>,
}

impl WeightConfig {
    pub fn get(&self, factor: Factor) -> Option<u32> {
        match factor {
            Factor::MarketSize => self.market_size,
            Factor::TariffShipping => self.tariff_shipping,
            Factor::Willingness => self.willingness,
            Factor::SustainabilityCustomization => self.sustainability_customization,
            Factor::Seasonality => self.seasonality,
        }
    }

    /// Config key for a factor, as used in validation messages
    pub fn key(factor: Factor) -> &'static str {
        match factor {
            Factor::MarketSize => "market_size",
            Factor::TariffShipping => "tariff_shipping",
            Factor::Willingness => "willingness",
            Factor::SustainabilityCustomization => "sustainability_customization",
            Factor::Seasonality => "seasonality",
        }
    }

    pub fn to_raw(&self) -> RawWeights {
        Factor::ALL
            .into_iter()
            .map(|f| (f, self.get(f).unwrap_or_else(|| f.default_weight())))
            .collect()
    }

    pub fn from_raw(raw: &RawWeights) -> Self {
        Self {
            market_size: Some(raw.get(Factor::MarketSize)),
            tariff_shipping: Some(raw.get(Factor::TariffShipping)),
            willingness: Some(raw.get(Factor::Willingness)),
            sustainability_customization: Some(raw.get(Factor::SustainabilityCustomization)),
            seasonality: Some(raw.get(Factor::Seasonality)),
        }
    }
}
