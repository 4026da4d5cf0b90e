//! Anomaly scoring against climatological baselines.
//!
//! Observations are standardized as `(x - mean) / sigma` using the baseline
//! for their ordinal day (or the pooled baseline for annual data). Variables
//! with a known optimum are first folded into deviations from that optimum,
//! so that "too wet" and "too dry" both score as positive anomalies.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::algorithms::climatology::DailyClimatology;
use crate::core::domain::{AnnualSeries, DailySeries, WeightedStat};
use crate::core::error::{PhiError, PhiResult};
use crate::time::ordinal_day;

/// Standardized anomalies keyed like their source series.
pub type ZScoreSeries<K> = BTreeMap<K, f64>;

/// Fold a series into absolute deviations from an optimal value.
///
/// Only the mean moves; the variance and sample count of each entry are
/// unchanged, since `|x - c|` shifts and reflects but does not rescale.
pub fn optimal_deviation<K: Ord + Copy>(
    series: &BTreeMap<K, WeightedStat>,
    optimal: f64,
) -> BTreeMap<K, WeightedStat> {
    series
        .iter()
        .map(|(&key, stat)| {
            (
                key,
                WeightedStat::new((stat.mean - optimal).abs(), stat.variance, stat.count),
            )
        })
        .collect()
}

/// Standardize one value against a baseline entry.
///
/// # Returns
/// `(value - mean) / sigma`, or `UndefinedClimatology` when the baseline
/// spread is zero or not finite.
pub fn zscore(value: f64, entry: &WeightedStat) -> PhiResult<f64> {
    let sigma = entry.std_dev();
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(PhiError::UndefinedClimatology(format!(
            "baseline spread {sigma} cannot standardize a value"
        )));
    }
    Ok((value - entry.mean) / sigma)
}

/// Score every entry of a daily series against the daily climatology.
///
/// # Arguments
/// * `series` - Daily observations to standardize
/// * `climatology` - Baseline built from the reference years
///
/// # Returns
/// One z-score per date, or `UndefinedClimatology` naming the first date
/// whose ordinal day has no baseline.
pub fn daily_zscores(
    series: &DailySeries,
    climatology: &DailyClimatology,
) -> PhiResult<ZScoreSeries<NaiveDate>> {
    series
        .iter()
        .map(|(&date, stat)| {
            let day = ordinal_day(date);
            let entry = climatology.entry(day).ok_or_else(|| {
                PhiError::UndefinedClimatology(format!(
                    "no baseline for ordinal day {day} (observation on {date})"
                ))
            })?;
            Ok((date, zscore(stat.mean, entry)?))
        })
        .collect()
}

/// Score every entry of an annual series against the pooled baseline.
pub fn annual_zscores(
    series: &AnnualSeries,
    baseline: &WeightedStat,
) -> PhiResult<ZScoreSeries<i32>> {
    series
        .iter()
        .map(|(&year, stat)| Ok((year, zscore(stat.mean, baseline)?)))
        .collect()
}
