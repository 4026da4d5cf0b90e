use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::domain::{AnnualSeries, DailySeries, VariableLoading, WeightedStat};
use crate::dataset::info::DatasetInfo;

/// Raw `(timestamp, value)` records of one daily table column.
pub type DailyRecords = Vec<(NaiveDate, f64)>;
/// Raw `(year, value)` records of one annual table column.
pub type AnnualRecords = Vec<(i32, f64)>;

/// The four raw tables a site ships: daily and annual values, each paired
/// with a variance table over the same variables and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesTables {
    pub data: BTreeMap<String, DailyRecords>,
    pub variance: BTreeMap<String, DailyRecords>,
    pub annual_data: BTreeMap<String, AnnualRecords>,
    pub annual_variance: BTreeMap<String, AnnualRecords>,
}

/// Value and variance tables merged into per-variable series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteSeries {
    pub daily: BTreeMap<String, DailySeries>,
    pub annual: BTreeMap<String, AnnualSeries>,
}

impl SiteSeries {
    /// Variable names carried by the series.
    pub fn variables(&self) -> impl Iterator<Item = &String> {
        self.daily.keys()
    }
}

/// Everything known about one site: metadata, merged series, and the
/// loading schemes it can be combined under.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteDataset {
    pub info: DatasetInfo,
    pub series: SiteSeries,
    pub loadings: BTreeMap<String, VariableLoading>,
}

impl SiteDataset {
    /// Bundle the parts, checking that the declared default loading exists.
    pub fn new(
        info: DatasetInfo,
        series: SiteSeries,
        loadings: BTreeMap<String, VariableLoading>,
    ) -> Result<Self> {
        if !loadings.contains_key(&info.default_variable_loading_name) {
            bail!(
                "dataset '{}' declares default loading '{}' but does not carry it",
                info.name,
                info.default_variable_loading_name
            );
        }
        Ok(Self { info, series, loadings })
    }

    /// The loading scheme the dataset declares as its default.
    pub fn default_loading(&self) -> Result<&VariableLoading> {
        self.loading(&self.info.default_variable_loading_name)
    }

    /// A loading scheme by name.
    pub fn loading(&self, name: &str) -> Result<&VariableLoading> {
        self.loadings.get(name).with_context(|| {
            format!("dataset '{}' carries no loading named '{}'", self.info.name, name)
        })
    }
}

/// Parse the raw tables from a JSON file.
pub fn parse_tables(path: &Path) -> Result<TimeSeriesTables> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read time series file: {}", path.display()))?;
    parse_tables_str(&content)
        .with_context(|| format!("Failed to parse time series file: {}", path.display()))
}

/// Parse the raw tables from a JSON string.
pub fn parse_tables_str(json_str: &str) -> Result<TimeSeriesTables> {
    let mut deserializer = serde_json::Deserializer::from_str(json_str);
    let tables: TimeSeriesTables = serde_path_to_error::deserialize(&mut deserializer)
        .context("Invalid time series JSON")?;
    Ok(tables)
}

/// Merge the four raw tables into per-variable series.
///
/// The tables must agree on their variable set, and within a variable the
/// value and variance records must be paired timestamp by timestamp.
/// Records whose value is missing are dropped, since an absent observation
/// is how sparse products encode gaps; a present value with a missing or
/// non-positive variance is an error, because nothing downstream can weight
/// it.
pub fn assemble_site_series(tables: &TimeSeriesTables) -> Result<SiteSeries> {
    let variables: BTreeSet<&String> = tables.data.keys().collect();
    check_same_variables(&variables, tables.variance.keys().collect(), "variance")?;
    check_same_variables(&variables, tables.annual_data.keys().collect(), "annual_data")?;
    check_same_variables(&variables, tables.annual_variance.keys().collect(), "annual_variance")?;

    let mut series = SiteSeries::default();
    for &variable in &variables {
        let daily = pair_records(
            variable,
            "daily",
            &tables.data[variable],
            &tables.variance[variable],
        )?;
        let annual = pair_records(
            variable,
            "annual",
            &tables.annual_data[variable],
            &tables.annual_variance[variable],
        )?;
        series.daily.insert(variable.clone(), daily);
        series.annual.insert(variable.clone(), annual);
    }

    Ok(series)
}

fn check_same_variables(
    reference: &BTreeSet<&String>,
    other: BTreeSet<&String>,
    table: &str,
) -> Result<()> {
    if *reference == other {
        return Ok(());
    }
    let missing: Vec<&&String> = reference.difference(&other).collect();
    let extra: Vec<&&String> = other.difference(reference).collect();
    bail!(
        "{} table disagrees with the data table on variables (missing: {:?}, extra: {:?})",
        table,
        missing,
        extra
    )
}

/// Zip one variable's value and variance records into a series.
fn pair_records<K: Ord + Copy + Display>(
    variable: &str,
    table: &str,
    values: &[(K, f64)],
    variances: &[(K, f64)],
) -> Result<BTreeMap<K, WeightedStat>> {
    if values.len() != variances.len() {
        bail!(
            "variable '{}' has {} {} values but {} variances",
            variable,
            values.len(),
            table,
            variances.len()
        );
    }

    let mut series = BTreeMap::new();
    let mut dropped = 0usize;

    for (&(key, value), &(variance_key, variance)) in values.iter().zip(variances) {
        if key != variance_key {
            bail!(
                "variable '{}' {} tables disagree on timestamps: value at {}, variance at {}",
                variable,
                table,
                key,
                variance_key
            );
        }
        if value.is_nan() {
            dropped += 1;
            continue;
        }
        if !variance.is_finite() {
            bail!(
                "variable '{}' has no usable variance for the {} value at {}",
                variable,
                table,
                key
            );
        }
        if variance <= 0.0 {
            bail!(
                "variable '{}' has non-positive variance {} at {} ({})",
                variable,
                variance,
                key,
                table
            );
        }
        if series.insert(key, WeightedStat::new(value, variance, 1)).is_some() {
            bail!("variable '{}' has duplicate {} timestamp {}", variable, table, key);
        }
    }

    if dropped > 0 {
        debug!(
            "variable '{}' dropped {} empty {} records of {}",
            variable,
            dropped,
            table,
            values.len()
        );
    }

    Ok(series)
}
