//! Per-variable anomaly analysis.
//!
//! Each variable runs the same sequence: fold toward its optimal value when
//! one is configured, build the climatological baseline, derive the
//! plotting envelope, and standardize every observation against the
//! baseline. The resulting report carries each intermediate stage so that
//! callers can inspect or plot any of them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::debug;

use crate::algorithms::anomaly::{annual_zscores, daily_zscores, optimal_deviation, ZScoreSeries};
use crate::algorithms::climatology::{
    annual_climatology, annual_envelope, climatology_envelope, daily_climatology,
    ClimatologyBand, DailyClimatology,
};
use crate::core::domain::{AnnualSeries, DailySeries, WeightedStat};
use crate::core::error::PhiResult;

/// Every stage of one variable's daily analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableReport {
    pub name: String,
    pub unit: Option<String>,
    /// Input series as received.
    pub series: DailySeries,
    /// Series after folding toward the optimal value, when one is set;
    /// otherwise identical to `series`.
    pub transformed: DailySeries,
    pub climatology: DailyClimatology,
    pub envelope: BTreeMap<NaiveDate, ClimatologyBand>,
    pub zscores: ZScoreSeries<NaiveDate>,
}

impl VariableReport {
    /// Axis label, `"name (unit)"` when the unit is known.
    pub fn display_label(&self) -> String {
        display_label(&self.name, self.unit.as_deref())
    }
}

/// Every stage of one variable's annual analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualVariableReport {
    pub name: String,
    pub unit: Option<String>,
    pub series: AnnualSeries,
    pub transformed: AnnualSeries,
    /// Pooled baseline shared by all years.
    pub climatology: WeightedStat,
    pub envelope: BTreeMap<i32, ClimatologyBand>,
    pub zscores: ZScoreSeries<i32>,
}

impl AnnualVariableReport {
    pub fn display_label(&self) -> String {
        display_label(&self.name, self.unit.as_deref())
    }
}

fn display_label(name: &str, unit: Option<&str>) -> String {
    match unit {
        Some(unit) => format!("{name} ({unit})"),
        None => name.to_string(),
    }
}

/// Run the daily analysis sequence for one variable.
///
/// # Arguments
/// * `name` - Variable name, used for labelling and error context
/// * `series` - Daily observations
/// * `optimal` - Optimal value to fold deviations around, if configured
/// * `unit` - Display unit, if known
pub fn analyze_daily_variable(
    name: &str,
    series: &DailySeries,
    optimal: Option<f64>,
    unit: Option<&str>,
) -> PhiResult<VariableReport> {
    let transformed = match optimal {
        Some(value) => optimal_deviation(series, value),
        None => series.clone(),
    };

    let climatology = daily_climatology(&transformed)?;
    let dates: Vec<NaiveDate> = transformed.keys().copied().collect();
    let envelope = climatology_envelope(&climatology, &dates);
    let zscores = daily_zscores(&transformed, &climatology)?;

    debug!(
        "analyzed daily variable '{}': {} observations, {} climatology days",
        name,
        series.len(),
        climatology.defined_count()
    );

    Ok(VariableReport {
        name: name.to_string(),
        unit: unit.map(str::to_string),
        series: series.clone(),
        transformed,
        climatology,
        envelope,
        zscores,
    })
}

/// Run the annual analysis sequence for one variable.
pub fn analyze_annual_variable(
    name: &str,
    series: &AnnualSeries,
    optimal: Option<f64>,
    unit: Option<&str>,
) -> PhiResult<AnnualVariableReport> {
    let transformed = match optimal {
        Some(value) => optimal_deviation(series, value),
        None => series.clone(),
    };

    let climatology = annual_climatology(&transformed)?;
    let years: Vec<i32> = transformed.keys().copied().collect();
    let envelope = annual_envelope(&climatology, &years);
    let zscores = annual_zscores(&transformed, &climatology)?;

    debug!(
        "analyzed annual variable '{}': {} years",
        name,
        series.len()
    );

    Ok(AnnualVariableReport {
        name: name.to_string(),
        unit: unit.map(str::to_string),
        series: series.clone(),
        transformed,
        climatology,
        envelope,
        zscores,
    })
}
