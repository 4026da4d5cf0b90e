//! Site-level indicator computation.
//!
//! Orchestrates the full sequence for one site: analyze every variable the
//! dataset carries, then combine the anomalies of the variables the loading
//! scheme weights into the health indicator series. Variable analyses are
//! independent and fan out over a worker pool.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{error, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::algorithms::anomaly::ZScoreSeries;
use crate::algorithms::indicator::{combine_series, normalized_weights, PhiSeries};
use crate::config::EngineConfig;
use crate::core::domain::VariableLoading;
use crate::core::error::{PhiError, PhiResult};
use crate::dataset::bundle::SiteDataset;
use crate::services::variable::{
    analyze_annual_variable, analyze_daily_variable, AnnualVariableReport, VariableReport,
};

/// Processing mode for the per-variable fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// Single-threaded processing
    Sequential,
    /// Parallel processing using all available cores
    #[default]
    Parallel,
    /// Parallel with specified number of threads
    ParallelWith(usize),
}

impl ProcessingMode {
    /// Mode for a configured thread count, zero meaning one per core.
    pub fn from_threads(threads: usize) -> Self {
        match threads {
            0 => ProcessingMode::Parallel,
            n => ProcessingMode::ParallelWith(n),
        }
    }
}

/// Map `f` over `items` according to the processing mode.
#[cfg(feature = "parallel")]
fn fan_out<I, T, F>(mode: ProcessingMode, items: Vec<I>, f: F) -> PhiResult<Vec<T>>
where
    I: Send,
    T: Send,
    F: Fn(I) -> T + Sync + Send,
{
    match mode {
        ProcessingMode::Sequential => Ok(items.into_iter().map(f).collect()),
        ProcessingMode::Parallel => Ok(items.into_par_iter().map(f).collect()),
        ProcessingMode::ParallelWith(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| {
                    PhiError::Configuration(format!("Failed to build thread pool: {e}"))
                })?;
            Ok(pool.install(|| items.into_par_iter().map(f).collect()))
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn fan_out<I, T, F>(_mode: ProcessingMode, items: Vec<I>, f: F) -> PhiResult<Vec<T>>
where
    F: Fn(I) -> T,
{
    Ok(items.into_iter().map(f).collect())
}

/// Indicator series and per-variable reports of a daily run.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPhiReport {
    pub phi: PhiSeries<NaiveDate>,
    pub variables: BTreeMap<String, VariableReport>,
}

/// Indicator series and per-variable reports of an annual run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualPhiReport {
    pub phi: PhiSeries<i32>,
    pub variables: BTreeMap<String, AnnualVariableReport>,
}

/// Compute the daily indicator series for a site.
///
/// All variables carried by the dataset are analyzed, so the report can
/// show every series even when the loading ignores some of them. A failed
/// analysis is fatal only for variables the loading actually weights;
/// zero-loading failures are skipped with a warning.
///
/// # Arguments
/// * `dataset` - Assembled site dataset
/// * `loading` - Loading scheme to combine under
/// * `config` - Engine settings (worker pool, missing-variable policy)
pub fn compute_daily_phi(
    dataset: &SiteDataset,
    loading: &VariableLoading,
    config: &EngineConfig,
) -> PhiResult<DailyPhiReport> {
    let weights = normalized_weights(loading)?;
    warn_absent_variables(dataset.series.daily.keys(), &weights, loading);

    let mode = ProcessingMode::from_threads(config.parallel.threads);
    let items: Vec<(&String, _)> = dataset.series.daily.iter().collect();
    let results = fan_out(mode, items, |(name, series)| {
        let report = analyze_daily_variable(
            name,
            series,
            loading.optimal_value(name),
            dataset.info.units.get(name).map(String::as_str),
        );
        (name, report)
    })?;

    let mut variables = BTreeMap::new();
    let mut zscores: BTreeMap<String, ZScoreSeries<NaiveDate>> = BTreeMap::new();
    for (name, result) in results {
        let contributes = weights.get(name).copied().unwrap_or(0.0) != 0.0;
        match result {
            Ok(report) => {
                if contributes {
                    zscores.insert(name.clone(), report.zscores.clone());
                }
                variables.insert(name.clone(), report);
            }
            Err(err) if !contributes => {
                warn!("skipping unweighted variable '{name}': {err}");
            }
            Err(err) => {
                error!("analysis failed for weighted variable '{name}'");
                return Err(err);
            }
        }
    }

    let phi = combine_series(&zscores, loading, config.missing_weight_policy())?;
    info!(
        "daily indicator for site '{}' under loading '{}': {} points from {} variables",
        dataset.info.site_id,
        loading.name,
        phi.len(),
        zscores.len()
    );

    Ok(DailyPhiReport { phi, variables })
}

/// Compute the annual indicator series for a site.
///
/// Same sequence as [`compute_daily_phi`], with every year scored against
/// the pooled baseline instead of a per-day one.
pub fn compute_annual_phi(
    dataset: &SiteDataset,
    loading: &VariableLoading,
    config: &EngineConfig,
) -> PhiResult<AnnualPhiReport> {
    let weights = normalized_weights(loading)?;
    warn_absent_variables(dataset.series.annual.keys(), &weights, loading);

    let mode = ProcessingMode::from_threads(config.parallel.threads);
    let items: Vec<(&String, _)> = dataset.series.annual.iter().collect();
    let results = fan_out(mode, items, |(name, series)| {
        let report = analyze_annual_variable(
            name,
            series,
            loading.optimal_value(name),
            dataset.info.units.get(name).map(String::as_str),
        );
        (name, report)
    })?;

    let mut variables = BTreeMap::new();
    let mut zscores: BTreeMap<String, ZScoreSeries<i32>> = BTreeMap::new();
    for (name, result) in results {
        let contributes = weights.get(name).copied().unwrap_or(0.0) != 0.0;
        match result {
            Ok(report) => {
                if contributes {
                    zscores.insert(name.clone(), report.zscores.clone());
                }
                variables.insert(name.clone(), report);
            }
            Err(err) if !contributes => {
                warn!("skipping unweighted variable '{name}': {err}");
            }
            Err(err) => {
                error!("analysis failed for weighted variable '{name}'");
                return Err(err);
            }
        }
    }

    let phi = combine_series(&zscores, loading, config.missing_weight_policy())?;
    info!(
        "annual indicator for site '{}' under loading '{}': {} points from {} variables",
        dataset.info.site_id,
        loading.name,
        phi.len(),
        zscores.len()
    );

    Ok(AnnualPhiReport { phi, variables })
}

/// Warn once per weighted variable the dataset does not carry.
fn warn_absent_variables<'a>(
    present: impl Iterator<Item = &'a String>,
    weights: &BTreeMap<String, f64>,
    loading: &VariableLoading,
) {
    let present: std::collections::BTreeSet<&String> = present.collect();
    for (name, &weight) in weights {
        if weight != 0.0 && !present.contains(name) {
            warn!(
                "loading '{}' weights variable '{}' but the dataset has no series for it",
                loading.name, name
            );
        }
    }
}
