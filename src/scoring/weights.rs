use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;

use super::factors::{Factor, MarketType};

/// Upper bound for a single raw weight
pub const MAX_WEIGHT: u32 = 100;

/// Sum the active normalized weights aim for
pub const WEIGHT_TOTAL: u32 = 100;

/// Raw slider positions, one per factor, each clamped to `0..=MAX_WEIGHT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWeights {
    values: BTreeMap<Factor, u32>,
}

impl RawWeights {
    /// All factors at zero
    pub fn zeroed() -> Self {
        Self {
            values: Factor::ALL.into_iter().map(|f| (f, 0)).collect(),
        }
    }

    pub fn get(&self, factor: Factor) -> u32 {
        self.values.get(&factor).copied().unwrap_or(0)
    }

    pub fn set(&mut self, factor: Factor, value: u32) {
        self.values.insert(factor, value.min(MAX_WEIGHT));
    }

    /// Move a weight by `delta`, saturating at both ends of the range
    pub fn adjust(&mut self, factor: Factor, delta: i32) {
        let current = self.get(factor);
        let next = current.saturating_add_signed(delta);
        self.set(factor, next);
    }

    pub fn with(mut self, factor: Factor, value: u32) -> Self {
        self.set(factor, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Factor, u32)> + '_ {
        self.values.iter().map(|(f, v)| (*f, *v))
    }
}

impl Default for RawWeights {
    fn default() -> Self {
        Self {
            values: Factor::ALL
                .into_iter()
                .map(|f| (f, f.default_weight()))
                .collect(),
        }
    }
}

impl FromIterator<(Factor, u32)> for RawWeights {
    fn from_iter<I: IntoIterator<Item = (Factor, u32)>>(iter: I) -> Self {
        let mut weights = RawWeights::zeroed();
        for (factor, value) in iter {
            weights.set(factor, value);
        }
        weights
    }
}

/// Weights rescaled so the active factors sum to 100.
///
/// Holds only active factors. A new value is built on every recompute;
/// there is no way to mutate one in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedWeights {
    weights: BTreeMap<Factor, u32>,
}

impl NormalizedWeights {
    pub fn get(&self, factor: Factor) -> Option<u32> {
        self.weights.get(&factor).copied()
    }

    pub fn contains(&self, factor: Factor) -> bool {
        self.weights.contains_key(&factor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Factor, u32)> + '_ {
        self.weights.iter().map(|(f, w)| (*f, *w))
    }

    pub fn factors(&self) -> impl Iterator<Item = Factor> + '_ {
        self.weights.keys().copied()
    }

    pub fn total(&self) -> u32 {
        self.weights.values().sum()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl FromIterator<(Factor, u32)> for NormalizedWeights {
    fn from_iter<I: IntoIterator<Item = (Factor, u32)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}

/// Normalize raw weights for the factors active under `market`.
pub fn normalize(raw: &RawWeights, market: MarketType) -> NormalizedWeights {
    normalize_active(raw, &Factor::active_for(market))
}

/// Normalize raw weights over an explicit active set.
///
/// Factors outside `active` take no part: they are left out of the sum and
/// out of the result. Each weight is rounded on its own (half to even), so
/// the result may total 99 or 101. When every active weight is zero the
/// active factors share 100 equally.
pub fn normalize_active(raw: &RawWeights, active: &[Factor]) -> NormalizedWeights {
    let total: u32 = active.iter().map(|f| raw.get(*f)).sum();

    if total == 0 {
        return equal_split(active);
    }

    let factor = f64::from(WEIGHT_TOTAL) / f64::from(total);
    active
        .iter()
        .map(|&f| (f, round_weight(f64::from(raw.get(f)) * factor)))
        .collect()
}

fn equal_split(active: &[Factor]) -> NormalizedWeights {
    if active.is_empty() {
        return NormalizedWeights::default();
    }
    let share = round_weight(f64::from(WEIGHT_TOTAL) / active.len() as f64);
    active.iter().map(|&f| (f, share)).collect()
}

fn round_weight(value: f64) -> u32 {
    // value is within 0..=100 by construction
    value.round_ties_even().clamp(0.0, f64::from(WEIGHT_TOTAL)) as u32
}

/// Parse a `factor=value` override as given to `--weight`.
pub fn parse_weight_override(s: &str) -> Result<(Factor, u32)> {
    let Some((name, value)) = s.split_once('=') else {
        bail!("Weight override must look like 'factor=value', got '{}'", s);
    };
    let factor: Factor = name.parse()?;
    let value: u32 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid weight '{}' for {}", value.trim(), factor))?;
    if value > MAX_WEIGHT {
        bail!("Weight for {} must be between 0 and {}, got {}", factor, MAX_WEIGHT, value);
    }
    Ok((factor, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_weights() -> RawWeights {
        RawWeights::zeroed()
            .with(Factor::MarketSize, 30)
            .with(Factor::TariffShipping, 20)
            .with(Factor::Willingness, 30)
            .with(Factor::SustainabilityCustomization, 10)
            .with(Factor::Seasonality, 10)
    }

    #[test]
    fn test_security_drops_seasonality_and_renormalizes() {
        let normalized = normalize(&example_weights(), MarketType::Security);

        assert!(!normalized.contains(Factor::Seasonality));
        assert_eq!(normalized.get(Factor::MarketSize), Some(33));
        assert_eq!(normalized.get(Factor::TariffShipping), Some(22));
        assert_eq!(normalized.get(Factor::Willingness), Some(33));
        assert_eq!(normalized.get(Factor::SustainabilityCustomization), Some(11));
        // Independent rounding: 33 + 22 + 33 + 11
        assert_eq!(normalized.total(), 99);
    }

    #[test]
    fn test_school_keeps_weights_already_summing_to_100() {
        let normalized = normalize(&example_weights(), MarketType::School);
        assert_eq!(normalized.len(), 5);
        for factor in Factor::ALL {
            assert_eq!(normalized.get(factor), Some(example_weights().get(factor)));
        }
    }

    #[test]
    fn test_inactive_raw_weight_is_ignored() {
        let a = normalize(&example_weights(), MarketType::Medical);
        let b = normalize(&example_weights().with(Factor::Seasonality, 95), MarketType::Medical);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_total_splits_equally() {
        let raw = RawWeights::zeroed();

        let security = normalize(&raw, MarketType::Security);
        assert_eq!(security.len(), 4);
        assert!(security.iter().all(|(_, w)| w == 25));

        let school = normalize(&raw, MarketType::School);
        assert_eq!(school.len(), 5);
        assert!(school.iter().all(|(_, w)| w == 20));
        assert_eq!(school.total(), 100);
    }

    #[test]
    fn test_zero_active_total_with_nonzero_inactive() {
        // Only seasonality has weight, but it is inactive for security
        let raw = RawWeights::zeroed().with(Factor::Seasonality, 50);
        let normalized = normalize(&raw, MarketType::Security);
        assert_eq!(normalized.total(), 100);
        assert!(!normalized.contains(Factor::Seasonality));
    }

    #[test]
    fn test_single_nonzero_factor_takes_everything() {
        let raw = RawWeights::zeroed().with(Factor::Willingness, 7);
        let normalized = normalize(&raw, MarketType::Security);
        assert_eq!(normalized.get(Factor::Willingness), Some(100));
        assert_eq!(normalized.get(Factor::MarketSize), Some(0));
    }

    #[test]
    fn test_sum_stays_within_rounding_tolerance() {
        for market in MarketType::ALL {
            let active = Factor::active_for(market).len() as i64;
            for a in [0, 1, 7, 33, 50, 100] {
                for b in [0, 3, 19, 64, 100] {
                    for c in [1, 11, 45, 99] {
                        let raw = RawWeights::zeroed()
                            .with(Factor::MarketSize, a)
                            .with(Factor::TariffShipping, b)
                            .with(Factor::Willingness, c)
                            .with(Factor::SustainabilityCustomization, 13)
                            .with(Factor::Seasonality, 29);
                        let total = i64::from(normalize(&raw, market).total());
                        assert!(
                            (total - 100).abs() <= active - 1,
                            "total {} for {:?} with {}/{}/{}",
                            total,
                            market,
                            a,
                            b,
                            c
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_scale_invariance() {
        let base = RawWeights::zeroed()
            .with(Factor::MarketSize, 12)
            .with(Factor::TariffShipping, 7)
            .with(Factor::Willingness, 20)
            .with(Factor::SustainabilityCustomization, 5)
            .with(Factor::Seasonality, 6);
        for k in [2, 3, 5] {
            let scaled: RawWeights = base.iter().map(|(f, v)| (f, v * k)).collect();
            for market in MarketType::ALL {
                assert_eq!(normalize(&base, market), normalize(&scaled, market));
            }
        }
    }

    #[test]
    fn test_reincluding_seasonality_keeps_other_proportions() {
        let raw = example_weights();
        let security = normalize(&raw, MarketType::Security);
        let school = normalize(&raw, MarketType::School);

        assert!(school.contains(Factor::Seasonality));
        // Market Size and Willingness were equal before; they stay equal, and
        // both stay above Tariff in either mode
        for weights in [&security, &school] {
            assert_eq!(weights.get(Factor::MarketSize), weights.get(Factor::Willingness));
            assert!(weights.get(Factor::MarketSize) > weights.get(Factor::TariffShipping));
        }
        // Raw inputs are untouched by either normalization
        assert_eq!(raw, example_weights());
    }

    #[test]
    fn test_normalize_active_empty_set() {
        let normalized = normalize_active(&example_weights(), &[]);
        assert!(normalized.is_empty());
    }

    #[test]
    fn test_set_clamps_to_max() {
        let mut raw = RawWeights::zeroed();
        raw.set(Factor::MarketSize, 250);
        assert_eq!(raw.get(Factor::MarketSize), 100);
    }

    #[test]
    fn test_adjust_saturates() {
        let mut raw = RawWeights::zeroed().with(Factor::TariffShipping, 5);
        raw.adjust(Factor::TariffShipping, -10);
        assert_eq!(raw.get(Factor::TariffShipping), 0);
        raw.adjust(Factor::TariffShipping, 95);
        raw.adjust(Factor::TariffShipping, 10);
        assert_eq!(raw.get(Factor::TariffShipping), 100);
    }

    #[test]
    fn test_parse_weight_override() {
        let (factor, value) = parse_weight_override("market-size=40").unwrap();
        assert_eq!(factor, Factor::MarketSize);
        assert_eq!(value, 40);

        let (factor, value) = parse_weight_override("Tariff & Shipping = 5").unwrap();
        assert_eq!(factor, Factor::TariffShipping);
        assert_eq!(value, 5);
    }

    #[test]
    fn test_parse_weight_override_errors() {
        assert!(parse_weight_override("market-size").is_err());
        assert!(parse_weight_override("market-size=abc").is_err());
        assert!(parse_weight_override("market-size=101").is_err());
        assert!(parse_weight_override("population=10").is_err());
    }
}
