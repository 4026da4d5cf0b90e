//! Production of per-variable series from raster snapshots.
//!
//! This is the ingest half of the engine: each dated snapshot of a gridded
//! product is reduced to one weighted zone mean whose variance is the
//! correlation-aware bound, then the resulting sparse series is annualized
//! and densified to daily resolution.

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::algorithms::aggregation::weighted_mean_of_pixels;
use crate::algorithms::correlation::upper_bound_variance_with;
use crate::config::EngineConfig;
use crate::core::domain::{AnnualSeries, DailySeries, ResamplingRatio, WeightedStat};
use crate::core::error::{PhiError, PhiResult};
use crate::preprocessing::extraction::extract_masked_pixels;
use crate::preprocessing::uncertainty::UncertaintyModel;
use crate::transformations::interpolation::interpolate_daily;
use crate::transformations::resampling::annualize;

/// One dated grid of a product, flattened in layer order.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSnapshot {
    pub date: NaiveDate,
    pub values: Vec<f64>,
    pub uncertainties: Vec<f64>,
}

/// Daily and annual series extracted for one variable over one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSeries {
    /// Daily series, densified by linear interpolation between snapshots.
    pub daily: DailySeries,
    /// Annual series, aggregated from the observed snapshots only.
    pub annual: AnnualSeries,
}

/// Reduce dated snapshots to the daily and annual series of one variable.
///
/// Every snapshot is masked, aggregated to a weighted zone mean, and stored
/// with the correlation-aware variance bound instead of the naive variance,
/// since sub-pixels of a resampled product are anything but independent.
/// Snapshots whose zone contains no valid pixel are skipped. Annual
/// aggregation runs over the observed snapshots before interpolation, so
/// synthetic days never vote on annual statistics.
///
/// # Arguments
/// * `snapshots` - Dated grids, one per acquisition
/// * `mask` - Zone mask shared by all snapshots
/// * `model` - Conversion from the uncertainty band to variances
/// * `ratio` - Sub-pixels per native pixel, if known
/// * `config` - Engine settings (weight tolerance)
///
/// # Returns
/// The extracted series, or an error when snapshot dates repeat, shapes
/// disagree, or no snapshot yields a valid zone mean.
pub fn build_variable_series(
    snapshots: &[RasterSnapshot],
    mask: &[u8],
    model: UncertaintyModel,
    ratio: Option<ResamplingRatio>,
    config: &EngineConfig,
) -> PhiResult<VariableSeries> {
    let tolerance = config.aggregation.weight_tolerance;
    let mut observed = DailySeries::new();
    let mut skipped = 0usize;

    for snapshot in snapshots {
        let pixels = extract_masked_pixels(&snapshot.values, &snapshot.uncertainties, mask, model)?;

        let stat = match weighted_mean_of_pixels(&pixels) {
            Ok(stat) => stat,
            Err(PhiError::InsufficientData(_)) => {
                warn!("skipping snapshot {}: no valid pixel in zone", snapshot.date);
                skipped += 1;
                continue;
            }
            Err(err) => return Err(err),
        };
        let bound = upper_bound_variance_with(pixels.samples(), ratio, tolerance)?;

        let entry = WeightedStat::new(stat.mean, bound, stat.count);
        if observed.insert(snapshot.date, entry).is_some() {
            return Err(PhiError::Validation(format!(
                "duplicate snapshot date {}",
                snapshot.date
            )));
        }
        debug!(
            "zone mean for {}: {:.6} (bounded sigma {:.6}, {} pixels)",
            snapshot.date,
            entry.mean,
            bound.sqrt(),
            entry.count
        );
    }

    if observed.is_empty() {
        return Err(PhiError::InsufficientData(format!(
            "no usable snapshot among {}",
            snapshots.len()
        )));
    }

    let annual = annualize(&observed);
    let daily = interpolate_daily(&observed);

    info!(
        "extracted {} snapshots into {} daily and {} annual entries ({} skipped)",
        observed.len(),
        daily.len(),
        annual.len(),
        skipped
    );

    Ok(VariableSeries { daily, annual })
}
