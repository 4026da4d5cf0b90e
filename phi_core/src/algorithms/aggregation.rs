use log::debug;

use crate::core::domain::{MaskedPixelSet, Sample, WeightedStat};
use crate::core::error::{PhiError, PhiResult};

/// Compute the inverse-variance weighted mean of a set of samples.
///
/// Invalid samples are filtered out; the mean is `sum(w_i * x_i) / sum(w_i)`
/// over the valid remainder with `w_i = 1 / variance_i`. The attached
/// variance is the naive `1 / sum(w_i)`, which assumes independent samples;
/// see [`upper_bound_variance`](super::correlation::upper_bound_variance) for
/// the correlation-aware bound.
///
/// The result is deterministic for a given input order. Summation runs in
/// input order, so permuting the samples may change the result within float
/// rounding.
///
/// # Arguments
/// * `samples` - Observations with their variances, in layer order
///
/// # Returns
/// The aggregated stat, or `InsufficientData` when no valid sample remains.
pub fn weighted_mean(samples: &[Sample]) -> PhiResult<WeightedStat> {
    let mut weight_sum = 0.0;
    let mut weighted_value_sum = 0.0;
    let mut count = 0usize;

    for sample in samples.iter().filter(|s| s.is_valid()) {
        let weight = sample.weight();
        weight_sum += weight;
        weighted_value_sum += weight * sample.value;
        count += 1;
    }

    if count == 0 {
        return Err(PhiError::InsufficientData(format!(
            "no valid samples among {}",
            samples.len()
        )));
    }

    debug!("aggregated {} of {} samples", count, samples.len());

    Ok(WeightedStat::new(
        weighted_value_sum / weight_sum,
        1.0 / weight_sum,
        count,
    ))
}

/// Compute the inverse-variance weighted mean of a masked pixel set.
pub fn weighted_mean_of_pixels(pixels: &MaskedPixelSet) -> PhiResult<WeightedStat> {
    weighted_mean(pixels.samples())
}
