pub mod columns;
pub mod config;
pub mod engine;
pub mod factors;
pub mod validation;
pub mod weights;

pub use columns::{column_for, expected_headers, validate_lookup, MetricColumn, COUNTRY_COLUMN};
pub use config::{ScoringConfig, WeightConfig};
pub use engine::{
    aggregate, compute, round_to, score_row, FactorContribution, ScoreBreakdown, ScoreResult,
    DEFAULT_PRECISION, MAX_PRECISION,
};
pub use factors::{Factor, MarketType};
pub use validation::validate_scoring;
pub use weights::{
    normalize, normalize_active, parse_weight_override, NormalizedWeights, RawWeights, MAX_WEIGHT,
};
