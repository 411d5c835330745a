use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product category under evaluation.
///
/// Selects which market-size and willingness columns feed the score, and
/// whether seasonality counts at all.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    #[default]
    Security,
    Medical,
    School,
}

impl MarketType {
    pub const ALL: [MarketType; 3] = [MarketType::Security, MarketType::Medical, MarketType::School];

    pub fn label(self) -> &'static str {
        match self {
            MarketType::Security => "Security",
            MarketType::Medical => "Medical",
            MarketType::School => "School",
        }
    }

    /// Next market type in selector order, wrapping around
    pub fn next(self) -> Self {
        match self {
            MarketType::Security => MarketType::Medical,
            MarketType::Medical => MarketType::School,
            MarketType::School => MarketType::Security,
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A weighted scoring dimension.
///
/// Declaration order is display order: sliders, table columns and chart
/// segments all follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Factor {
    MarketSize,
    TariffShipping,
    Willingness,
    SustainabilityCustomization,
    Seasonality,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::MarketSize,
        Factor::TariffShipping,
        Factor::Willingness,
        Factor::SustainabilityCustomization,
        Factor::Seasonality,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Factor::MarketSize => "Market Size",
            Factor::TariffShipping => "Tariff & Shipping",
            Factor::Willingness => "Willingness",
            Factor::SustainabilityCustomization => "Sustainability & Customization",
            Factor::Seasonality => "Seasonality",
        }
    }

    /// Compact label for narrow table headers
    pub fn short_label(self) -> &'static str {
        match self {
            Factor::MarketSize => "Market",
            Factor::TariffShipping => "Tariff",
            Factor::Willingness => "Willing",
            Factor::SustainabilityCustomization => "Sustain",
            Factor::Seasonality => "Season",
        }
    }

    /// Identifier used on the command line (`--weight market-size=40`)
    pub fn slug(self) -> &'static str {
        match self {
            Factor::MarketSize => "market-size",
            Factor::TariffShipping => "tariff-shipping",
            Factor::Willingness => "willingness",
            Factor::SustainabilityCustomization => "sustainability-customization",
            Factor::Seasonality => "seasonality",
        }
    }

    pub fn default_weight(self) -> u32 {
        match self {
            Factor::MarketSize => 30,
            Factor::TariffShipping => 20,
            Factor::Willingness => 30,
            Factor::SustainabilityCustomization => 10,
            Factor::Seasonality => 10,
        }
    }

    /// Seasonality only matters for school products; every other factor
    /// applies to all market types.
    pub fn is_active(self, market: MarketType) -> bool {
        match self {
            Factor::Seasonality => market == MarketType::School,
            _ => true,
        }
    }

    pub fn active_for(market: MarketType) -> Vec<Factor> {
        Factor::ALL
            .into_iter()
            .filter(|f| f.is_active(market))
            .collect()
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Factor {
    type Err = anyhow::Error;

    /// Accepts the display label or the slug, case-insensitive.
    /// Underscores are read as dashes so config-style keys work too.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        for factor in Factor::ALL {
            if factor.slug() == wanted || factor.label().to_lowercase() == wanted {
                return Ok(factor);
            }
        }
        bail!(
            "Unknown factor '{}'. Expected one of: {}",
            s.trim(),
            Factor::ALL.map(Factor::slug).join(", ")
        )
    }
}
