//! Combination of per-variable anomalies into the health indicator.
//!
//! Each variable's z-score series is weighted by its normalized loading and
//! summed per timestamp. Variables missing at a timestamp contribute
//! nothing; whether the remaining weights are rescaled is a policy choice.

use std::collections::{BTreeMap, BTreeSet};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::algorithms::anomaly::ZScoreSeries;
use crate::core::domain::VariableLoading;
use crate::core::error::{PhiError, PhiResult};

/// One combined indicator value with its variable coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhiPoint {
    pub value: f64,
    /// Variables that contributed at this timestamp.
    pub variables_used: usize,
    /// Variables carrying a nonzero loading.
    pub variables_total: usize,
}

impl PhiPoint {
    /// Fraction of nonzero-loading variables present at this timestamp.
    pub fn coverage(&self) -> f64 {
        if self.variables_total == 0 {
            0.0
        } else {
            self.variables_used as f64 / self.variables_total as f64
        }
    }

    /// Whether every nonzero-loading variable contributed.
    pub fn is_complete(&self) -> bool {
        self.variables_used == self.variables_total
    }
}

/// Combined indicator series keyed like its source z-scores.
pub type PhiSeries<K> = BTreeMap<K, PhiPoint>;

/// How timestamps with missing variables are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingWeightPolicy {
    /// Keep the normalized weights as configured; missing variables simply
    /// drop their term, shrinking the combined magnitude.
    #[default]
    PreserveLoadings,
    /// Rescale by the absolute weight present, so partial timestamps keep
    /// full magnitude at the cost of leaning harder on what remains.
    RenormalizePresent,
}

/// Normalize a loading scheme to weights summing to one in absolute value.
///
/// Signs are preserved: a negative loading keeps pulling the indicator
/// down. Variables with an exact-zero loading are kept in the map so that
/// callers can tell "configured out" apart from "unknown".
///
/// # Returns
/// `loading / sum(|loading|)` per variable, or `InvalidLoading` when every
/// coefficient is zero.
pub fn normalized_weights(loading: &VariableLoading) -> PhiResult<BTreeMap<String, f64>> {
    let total: f64 = loading.variable_loadings.values().map(|l| l.abs()).sum();
    if !(total > 0.0) {
        return Err(PhiError::InvalidLoading(format!(
            "loading '{}' has no nonzero coefficients",
            loading.name
        )));
    }
    Ok(loading
        .variable_loadings
        .iter()
        .map(|(name, &l)| (name.clone(), l / total))
        .collect())
}

/// Combine per-variable z-score series into the indicator series.
///
/// The output carries one point per timestamp at which at least one
/// nonzero-loading variable has a score. Variables with a zero loading are
/// ignored entirely, as are series for variables the loading does not name.
///
/// # Arguments
/// * `zscores` - Z-score series per variable name
/// * `loading` - Loading scheme naming the variables to combine
/// * `policy` - Handling of timestamps with missing variables
pub fn combine_series<K: Ord + Copy>(
    zscores: &BTreeMap<String, ZScoreSeries<K>>,
    loading: &VariableLoading,
    policy: MissingWeightPolicy,
) -> PhiResult<PhiSeries<K>> {
    let weights = normalized_weights(loading)?;
    let active: Vec<(&String, f64)> = weights
        .iter()
        .filter(|(_, &w)| w != 0.0)
        .map(|(name, &w)| (name, w))
        .collect();
    let variables_total = active.len();

    let timestamps: BTreeSet<K> = active
        .iter()
        .filter_map(|(name, _)| zscores.get(*name))
        .flat_map(|series| series.keys().copied())
        .collect();

    let mut combined = PhiSeries::new();
    let mut partial = 0usize;

    for &timestamp in &timestamps {
        let mut value = 0.0;
        let mut present_abs = 0.0;
        let mut used = 0usize;

        for (name, weight) in &active {
            if let Some(score) = zscores.get(*name).and_then(|s| s.get(&timestamp)) {
                value += weight * score;
                present_abs += weight.abs();
                used += 1;
            }
        }

        if used < variables_total {
            partial += 1;
        }
        if policy == MissingWeightPolicy::RenormalizePresent {
            value /= present_abs;
        }

        combined.insert(
            timestamp,
            PhiPoint {
                value,
                variables_used: used,
                variables_total,
            },
        );
    }

    if partial > 0 {
        warn!(
            "indicator '{}' combined with partial coverage at {} of {} timestamps",
            loading.name,
            partial,
            combined.len()
        );
    }

    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loading(name: &str, pairs: &[(&str, f64)]) -> VariableLoading {
        VariableLoading {
            name: name.to_string(),
            description: String::new(),
            optimal_values: BTreeMap::new(),
            variable_loadings: pairs
                .iter()
                .map(|(n, l)| (n.to_string(), *l))
                .collect(),
        }
    }

    fn series(pairs: &[(i32, f64)]) -> ZScoreSeries<i32> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn weights_normalize_by_absolute_sum() {
        let loading = loading("test", &[("a", 0.6), ("b", -0.3), ("c", 0.0)]);
        let weights = normalized_weights(&loading).unwrap();
        assert!((weights["a"] - 2.0 / 3.0).abs() < 1e-12);
        assert!((weights["b"] + 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(weights["c"], 0.0);
    }

    #[test]
    fn all_zero_loading_is_invalid() {
        let loading = loading("empty", &[("a", 0.0), ("b", 0.0)]);
        assert!(matches!(
            normalized_weights(&loading),
            Err(PhiError::InvalidLoading(_))
        ));
        let zscores = BTreeMap::new();
        assert!(matches!(
            combine_series::<i32>(&zscores, &loading, MissingWeightPolicy::default()),
            Err(PhiError::InvalidLoading(_))
        ));
    }

    #[test]
    fn complete_timestamps_sum_weighted_scores() {
        let loading = loading("phi", &[("a", 0.6), ("b", 0.4)]);
        let mut zscores = BTreeMap::new();
        zscores.insert("a".to_string(), series(&[(2019, 1.0), (2020, 2.0)]));
        zscores.insert("b".to_string(), series(&[(2019, -1.0), (2020, 0.5)]));

        let phi = combine_series(&zscores, &loading, MissingWeightPolicy::default()).unwrap();
        assert!((phi[&2019].value - 0.2).abs() < 1e-12);
        assert!((phi[&2020].value - 1.4).abs() < 1e-12);
        assert!(phi[&2019].is_complete());
        assert_eq!(phi[&2019].variables_total, 2);
    }

    #[test]
    fn missing_variable_drops_its_term_by_default() {
        let loading = loading("phi", &[("a", 0.5), ("b", 0.5)]);
        let mut zscores = BTreeMap::new();
        zscores.insert("a".to_string(), series(&[(2020, 1.0)]));

        let phi = combine_series(&zscores, &loading, MissingWeightPolicy::PreserveLoadings)
            .unwrap();
        let point = &phi[&2020];
        assert!((point.value - 0.5).abs() < 1e-12);
        assert_eq!(point.variables_used, 1);
        assert_eq!(point.variables_total, 2);
        assert!((point.coverage() - 0.5).abs() < 1e-12);
        assert!(!point.is_complete());
    }

    #[test]
    fn renormalization_restores_full_magnitude() {
        let loading = loading("phi", &[("a", 0.5), ("b", 0.5)]);
        let mut zscores = BTreeMap::new();
        zscores.insert("a".to_string(), series(&[(2020, 1.0)]));

        let phi = combine_series(&zscores, &loading, MissingWeightPolicy::RenormalizePresent)
            .unwrap();
        assert!((phi[&2020].value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_loading_variables_never_contribute() {
        let loading = loading("phi", &[("a", 1.0), ("noise", 0.0)]);
        let mut zscores = BTreeMap::new();
        zscores.insert("a".to_string(), series(&[(2020, 2.0)]));
        zscores.insert("noise".to_string(), series(&[(2020, 50.0), (2021, 50.0)]));

        let phi = combine_series(&zscores, &loading, MissingWeightPolicy::default()).unwrap();
        assert!((phi[&2020].value - 2.0).abs() < 1e-12);
        assert_eq!(phi[&2020].variables_total, 1);
        // timestamps only seen by zero-loading variables do not appear
        assert!(!phi.contains_key(&2021));
    }

    #[test]
    fn unknown_series_are_ignored() {
        let loading = loading("phi", &[("a", 1.0)]);
        let mut zscores = BTreeMap::new();
        zscores.insert("a".to_string(), series(&[(2020, 1.0)]));
        zscores.insert("stray".to_string(), series(&[(2020, 99.0)]));

        let phi = combine_series(&zscores, &loading, MissingWeightPolicy::default()).unwrap();
        assert!((phi[&2020].value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn negative_loadings_invert_anomalies() {
        let loading = loading("phi", &[("wet", 0.5), ("dry", -0.5)]);
        let mut zscores = BTreeMap::new();
        zscores.insert("wet".to_string(), series(&[(2020, 1.0)]));
        zscores.insert("dry".to_string(), series(&[(2020, 1.0)]));

        let phi = combine_series(&zscores, &loading, MissingWeightPolicy::default()).unwrap();
        assert!(phi[&2020].value.abs() < 1e-12);
    }

    #[test]
    fn empty_zscores_yield_empty_series() {
        let loading = loading("phi", &[("a", 1.0)]);
        let zscores: BTreeMap<String, ZScoreSeries<i32>> = BTreeMap::new();
        let phi = combine_series(&zscores, &loading, MissingWeightPolicy::default()).unwrap();
        assert!(phi.is_empty());
    }
}
