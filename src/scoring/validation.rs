use super::config::{ScoringConfig, WeightConfig};
use super::engine::MAX_PRECISION;
use super::factors::Factor;
use super::weights::MAX_WEIGHT;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref weights) = config.weights {
        for factor in Factor::ALL {
            if let Some(value) = weights.get(factor) {
                if value > MAX_WEIGHT {
                    errors.push(format!(
                        "scoring.weights.{}: must be between 0 and {}, got {}",
                        WeightConfig::key(factor),
                        MAX_WEIGHT,
                        value
                    ));
                }
            }
        }
    }

    if let Some(precision) = config.precision {
        if precision > MAX_PRECISION {
            errors.push(format!(
                "scoring.precision: must be at most {}, got {}",
                MAX_PRECISION, precision
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
