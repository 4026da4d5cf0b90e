//! Climatological baselines over daily and annual series.
//!
//! A daily climatology collapses a multi-year series into one expected value
//! per ordinal day, so that any observation can be compared against what is
//! typical for that time of year. Aggregation reuses the inverse-variance
//! weighted mean, which keeps single-year days well defined and propagates
//! the baseline uncertainty alongside the baseline itself.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;

use crate::algorithms::aggregation::weighted_mean;
use crate::core::domain::{AnnualSeries, DailySeries, Sample, WeightedStat};
use crate::core::error::{PhiError, PhiResult};
use crate::time::{is_leap_day, ordinal_day, OrdinalDay, DAYS_PER_YEAR};

/// Expected value and spread for each of the 365 ordinal days.
///
/// Days never observed across the input years stay undefined rather than
/// being filled, so downstream scoring can tell "no baseline" apart from
/// "baseline of zero". February 29 observations are excluded when building
/// and score against day 59 (February 28) when looked up.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyClimatology {
    entries: Vec<Option<WeightedStat>>,
}

impl DailyClimatology {
    /// Build from one entry per ordinal day.
    ///
    /// # Arguments
    /// * `entries` - Exactly 365 entries, `None` for undefined days
    pub fn from_entries(entries: Vec<Option<WeightedStat>>) -> PhiResult<Self> {
        if entries.len() != DAYS_PER_YEAR {
            return Err(PhiError::Validation(format!(
                "daily climatology needs {} entries, got {}",
                DAYS_PER_YEAR,
                entries.len()
            )));
        }
        Ok(Self { entries })
    }

    /// Baseline for an ordinal day, if defined.
    pub fn entry(&self, day: OrdinalDay) -> Option<&WeightedStat> {
        self.entries[day.index()].as_ref()
    }

    /// Baseline for a calendar date, if defined.
    pub fn for_date(&self, date: NaiveDate) -> Option<&WeightedStat> {
        self.entry(ordinal_day(date))
    }

    /// Number of ordinal days with a defined baseline.
    pub fn defined_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Ordinal days with no baseline.
    pub fn undefined_days(&self) -> Vec<OrdinalDay> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_none())
            .map(|(i, _)| OrdinalDay::from_index(i))
            .collect()
    }

    /// Iterate defined entries as `(day, stat)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (OrdinalDay, &WeightedStat)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|s| (OrdinalDay::from_index(i), s)))
    }
}

/// Climatological mean with its one-sigma band, ready for plotting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimatologyBand {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ClimatologyBand {
    fn from_stat(stat: &WeightedStat) -> Self {
        let half_width = stat.std_dev();
        Self {
            mean: stat.mean,
            lower: stat.mean - half_width,
            upper: stat.mean + half_width,
        }
    }
}

/// Build the daily climatology of a multi-year series.
///
/// Observations are grouped by leap-insensitive ordinal day and each group
/// is reduced with the inverse-variance weighted mean. February 29 entries
/// are dropped before grouping. A day whose observations all carry
/// degenerate variances stays undefined.
///
/// # Arguments
/// * `series` - Daily series spanning one or more years
///
/// # Returns
/// The climatology, or `InsufficientData` when the series is empty or no
/// day could be defined.
pub fn daily_climatology(series: &DailySeries) -> PhiResult<DailyClimatology> {
    if series.is_empty() {
        return Err(PhiError::InsufficientData(
            "cannot build a climatology from an empty series".into(),
        ));
    }

    let mut groups: Vec<Vec<Sample>> = vec![Vec::new(); DAYS_PER_YEAR];
    for (&date, stat) in series {
        if is_leap_day(date) {
            continue;
        }
        groups[ordinal_day(date).index()].push(Sample::from(*stat));
    }

    let entries: Vec<Option<WeightedStat>> = groups
        .iter()
        .map(|group| {
            if group.is_empty() {
                None
            } else {
                weighted_mean(group).ok()
            }
        })
        .collect();

    let climatology = DailyClimatology::from_entries(entries)?;
    if climatology.defined_count() == 0 {
        return Err(PhiError::InsufficientData(
            "no ordinal day has a defined climatology".into(),
        ));
    }

    let undefined = DAYS_PER_YEAR - climatology.defined_count();
    if undefined > 0 {
        warn!("daily climatology leaves {} of {} days undefined", undefined, DAYS_PER_YEAR);
    }

    Ok(climatology)
}

/// Collapse an annual series into a single climatological baseline.
pub fn annual_climatology(series: &AnnualSeries) -> PhiResult<WeightedStat> {
    let samples: Vec<Sample> = series.values().map(|&stat| Sample::from(stat)).collect();
    if samples.is_empty() {
        return Err(PhiError::InsufficientData(
            "cannot build a climatology from an empty series".into(),
        ));
    }
    weighted_mean(&samples)
}

/// Expand the daily climatology into per-date bands for the requested dates.
/// Dates whose ordinal day is undefined are omitted.
pub fn climatology_envelope(
    climatology: &DailyClimatology,
    dates: &[NaiveDate],
) -> BTreeMap<NaiveDate, ClimatologyBand> {
    dates
        .iter()
        .filter_map(|&date| {
            climatology
                .for_date(date)
                .map(|stat| (date, ClimatologyBand::from_stat(stat)))
        })
        .collect()
}

/// Expand the annual baseline into per-year bands for the requested years.
pub fn annual_envelope(
    baseline: &WeightedStat,
    years: &[i32],
) -> BTreeMap<i32, ClimatologyBand> {
    years
        .iter()
        .map(|&year| (year, ClimatologyBand::from_stat(baseline)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stat(mean: f64, variance: f64) -> WeightedStat {
        WeightedStat::new(mean, variance, 1)
    }

    #[test]
    fn empty_series_is_insufficient() {
        let series = DailySeries::new();
        assert!(matches!(
            daily_climatology(&series),
            Err(PhiError::InsufficientData(_))
        ));
    }

    #[test]
    fn wrong_entry_count_is_rejected() {
        assert!(matches!(
            DailyClimatology::from_entries(vec![None; 364]),
            Err(PhiError::Validation(_))
        ));
    }

    #[test]
    fn groups_same_ordinal_day_across_years() {
        let mut series = DailySeries::new();
        series.insert(date(2019, 3, 10), stat(2.0, 0.5));
        series.insert(date(2020, 3, 10), stat(4.0, 0.25));
        let climatology = daily_climatology(&series).unwrap();

        assert_eq!(climatology.defined_count(), 1);
        let entry = climatology.for_date(date(2021, 3, 10)).unwrap();
        // weights 2 and 4: (2 * 2 + 4 * 4) / 6 = 10 / 3
        assert!((entry.mean - 10.0 / 3.0).abs() < 1e-12);
        assert!((entry.variance - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(entry.count, 2);
    }

    #[test]
    fn leap_day_is_excluded_from_building() {
        let mut series = DailySeries::new();
        series.insert(date(2020, 2, 28), stat(1.0, 1.0));
        series.insert(date(2020, 2, 29), stat(100.0, 1.0));
        let climatology = daily_climatology(&series).unwrap();

        let feb28 = climatology.for_date(date(2021, 2, 28)).unwrap();
        assert!((feb28.mean - 1.0).abs() < 1e-12);
        assert_eq!(feb28.count, 1);
    }

    #[test]
    fn leap_day_scores_against_february_28() {
        let mut series = DailySeries::new();
        series.insert(date(2019, 2, 28), stat(7.0, 1.0));
        let climatology = daily_climatology(&series).unwrap();

        let on_leap = climatology.for_date(date(2020, 2, 29)).unwrap();
        assert!((on_leap.mean - 7.0).abs() < 1e-12);
    }

    #[test]
    fn post_february_dates_align_across_year_kinds() {
        let mut series = DailySeries::new();
        series.insert(date(2019, 7, 1), stat(3.0, 1.0));
        let climatology = daily_climatology(&series).unwrap();

        // July 1 of a leap year must land on the same slot
        assert!(climatology.for_date(date(2020, 7, 1)).is_some());
        assert_eq!(climatology.defined_count(), 1);
    }

    #[test]
    fn degenerate_variance_day_stays_undefined() {
        let mut series = DailySeries::new();
        series.insert(date(2019, 5, 1), stat(3.0, 0.0));
        series.insert(date(2019, 5, 2), stat(4.0, 1.0));
        let climatology = daily_climatology(&series).unwrap();

        assert!(climatology.for_date(date(2020, 5, 1)).is_none());
        assert!(climatology.for_date(date(2020, 5, 2)).is_some());
    }

    #[test]
    fn undefined_days_are_listed() {
        let mut series = DailySeries::new();
        series.insert(date(2019, 1, 1), stat(1.0, 1.0));
        let climatology = daily_climatology(&series).unwrap();

        assert_eq!(climatology.defined_count(), 1);
        let undefined = climatology.undefined_days();
        assert_eq!(undefined.len(), DAYS_PER_YEAR - 1);
        assert_eq!(undefined[0].get(), 2);
    }

    #[test]
    fn annual_climatology_pools_years() {
        let mut series = AnnualSeries::new();
        series.insert(2019, stat(2.0, 0.5));
        series.insert(2020, stat(4.0, 0.25));
        let baseline = annual_climatology(&series).unwrap();

        assert!((baseline.mean - 10.0 / 3.0).abs() < 1e-12);
        assert!((baseline.variance - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn envelope_is_mean_plus_minus_sigma() {
        let mut series = DailySeries::new();
        series.insert(date(2019, 6, 1), stat(10.0, 4.0));
        let climatology = daily_climatology(&series).unwrap();

        let dates = vec![date(2020, 6, 1), date(2020, 6, 2)];
        let envelope = climatology_envelope(&climatology, &dates);

        assert_eq!(envelope.len(), 1);
        let band = &envelope[&date(2020, 6, 1)];
        assert!((band.mean - 10.0).abs() < 1e-12);
        assert!((band.lower - 8.0).abs() < 1e-12);
        assert!((band.upper - 12.0).abs() < 1e-12);
    }

    #[test]
    fn annual_envelope_repeats_the_baseline() {
        let baseline = stat(5.0, 1.0);
        let envelope = annual_envelope(&baseline, &[2019, 2020]);
        assert_eq!(envelope.len(), 2);
        assert!((envelope[&2019].upper - 6.0).abs() < 1e-12);
        assert_eq!(envelope[&2019], envelope[&2020]);
    }
}
