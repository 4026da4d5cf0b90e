//! Correlation-aware upper bound for the variance of a weighted mean.
//!
//! The naive `1 / sum(w)` variance of an inverse-variance weighted mean
//! assumes independent samples. Resampled products violate that assumption:
//! every native pixel is copied onto several grid cells, and those copies are
//! maximally correlated. The bound computed here groups samples of equal
//! weight and charges each group the worst case consistent with the known
//! resampling ratio, which always dominates the true variance.

use std::collections::HashMap;

use log::debug;

use crate::core::domain::{ResamplingRatio, Sample};
use crate::core::error::{PhiError, PhiResult};

/// Relative tolerance under which two weights are considered equal.
///
/// Equal-weight detection is what links sub-pixels back to their native
/// pixel; the tolerance absorbs float jitter introduced upstream.
pub const DEFAULT_WEIGHT_TOLERANCE: f64 = 1e-9;

/// Quantized bucket key so that weights within the relative tolerance
/// generally collide. Keeps the grouping O(n) instead of pairwise.
fn bucket_key(weight: f64, tolerance: f64) -> i64 {
    (weight.ln() / tolerance.ln_1p()).round() as i64
}

/// Compute the correlation-aware upper bound on the variance of the weighted
/// mean, using the default weight tolerance.
///
/// See [`upper_bound_variance_with`] for the semantics.
pub fn upper_bound_variance(
    samples: &[Sample],
    ratio: Option<ResamplingRatio>,
) -> PhiResult<f64> {
    upper_bound_variance_with(samples, ratio, DEFAULT_WEIGHT_TOLERANCE)
}

/// Compute the correlation-aware upper bound on the variance of the weighted
/// mean.
///
/// Valid samples are grouped into buckets of equal weight. With an unknown
/// resampling ratio every bucket is assumed fully correlated and contributes
/// `n^2 * w`. With a known ratio `r >= 2`, each complete native pixel of `r`
/// sub-pixels is fully correlated while distinct native pixels are
/// independent, so a bucket of `n` samples contributes
/// `(floor(n / r) * r^2 + (n mod r)^2) * w`, which never exceeds the
/// unknown-ratio contribution. A ratio of one carries no grouping
/// information and bounds exactly like an unknown ratio. The bound is the
/// summed contributions divided by the square of the exact weight total.
///
/// # Arguments
/// * `samples` - Observations with their variances, in layer order
/// * `ratio` - Sub-pixels per native pixel, if known
/// * `tolerance` - Relative tolerance for weight equality, in `(0, 1)`
///
/// # Returns
/// The variance bound, `InsufficientData` when no valid sample remains, or
/// `Configuration` for an unusable tolerance.
pub fn upper_bound_variance_with(
    samples: &[Sample],
    ratio: Option<ResamplingRatio>,
    tolerance: f64,
) -> PhiResult<f64> {
    if !(tolerance > 0.0 && tolerance < 1.0) {
        return Err(PhiError::Configuration(format!(
            "weight tolerance must be in (0, 1), got {tolerance}"
        )));
    }

    // bucket key -> (sample count, exact weight sum)
    let mut buckets: HashMap<i64, (usize, f64)> = HashMap::new();
    let mut total_weight = 0.0;
    let mut valid = 0usize;

    for sample in samples.iter().filter(|s| s.is_valid()) {
        let weight = sample.weight();
        total_weight += weight;
        valid += 1;
        let entry = buckets.entry(bucket_key(weight, tolerance)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += weight;
    }

    if valid == 0 {
        return Err(PhiError::InsufficientData(format!(
            "no valid samples among {}",
            samples.len()
        )));
    }

    let group_size = ratio.filter(|r| !r.is_unit()).map(|r| r.get() as usize);

    let mut numerator = 0.0;
    for &(count, weight_sum) in buckets.values() {
        let bucket_weight = weight_sum / count as f64;
        let contribution = match group_size {
            None => {
                let n = count as f64;
                n * n * bucket_weight
            }
            Some(size) => {
                let full = (count / size) as f64;
                let partial = (count % size) as f64;
                let r = size as f64;
                (full * r * r + partial * partial) * bucket_weight
            }
        };
        numerator += contribution;
    }

    debug!(
        "bounded mean variance over {} weight buckets ({} valid samples)",
        buckets.len(),
        valid
    );

    Ok(numerator / (total_weight * total_weight))
}
