use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scoring::{MarketType, ScoringConfig};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Market type selected at startup (default: security)
    #[serde(default)]
    pub market_type: Option<MarketType>,

    /// CSV file to load instead of the built-in table
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    #[serde(default)]
    pub scoring: Option<ScoringConfig>,

    #[serde(default)]
    pub theme: Option<ThemePreference>,
}

/// Dashboard palette choice
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Probe the terminal background
    #[default]
    Auto,
    Dark,
    Light,
}

impl Config {
    pub fn effective_scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }
}
