use chrono::Datelike;
use log::warn;

use crate::algorithms::aggregation::weighted_mean;
use crate::core::domain::{AnnualSeries, DailySeries, Sample};

/// Collapse a daily series into one entry per calendar year.
///
/// Each year is reduced with the inverse-variance weighted mean, so
/// well-constrained days dominate their year and the annual variance is
/// propagated instead of discarded. Years whose days are all invalid are
/// skipped with a warning.
pub fn annualize(series: &DailySeries) -> AnnualSeries {
    let mut by_year: AnnualSeries = AnnualSeries::new();
    let mut groups: std::collections::BTreeMap<i32, Vec<Sample>> = std::collections::BTreeMap::new();

    for (&date, &stat) in series {
        groups.entry(date.year()).or_default().push(Sample::from(stat));
    }

    for (year, samples) in groups {
        match weighted_mean(&samples) {
            Ok(stat) => {
                by_year.insert(year, stat);
            }
            Err(err) => {
                warn!("skipping year {year} in annual resampling: {err}");
            }
        }
    }

    by_year
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::WeightedStat;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn years_aggregate_independently() {
        let mut series = DailySeries::new();
        series.insert(date(2019, 3, 1), WeightedStat::new(2.0, 0.5, 1));
        series.insert(date(2019, 9, 1), WeightedStat::new(4.0, 0.25, 1));
        series.insert(date(2020, 3, 1), WeightedStat::new(10.0, 1.0, 1));

        let annual = annualize(&series);
        assert_eq!(annual.len(), 2);

        // 2019: weights 2 and 4
        assert!((annual[&2019].mean - 10.0 / 3.0).abs() < 1e-12);
        assert!((annual[&2019].variance - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(annual[&2019].count, 2);

        assert!((annual[&2020].mean - 10.0).abs() < 1e-12);
    }

    #[test]
    fn precise_days_dominate_their_year() {
        let mut series = DailySeries::new();
        series.insert(date(2020, 1, 1), WeightedStat::new(0.0, 100.0, 1));
        series.insert(date(2020, 7, 1), WeightedStat::new(10.0, 0.01, 1));

        let annual = annualize(&series);
        assert!((annual[&2020].mean - 10.0).abs() < 0.02);
    }

    #[test]
    fn all_invalid_year_is_skipped() {
        let mut series = DailySeries::new();
        series.insert(date(2019, 1, 1), WeightedStat::new(1.0, 0.0, 1));
        series.insert(date(2020, 1, 1), WeightedStat::new(2.0, 1.0, 1));

        let annual = annualize(&series);
        assert!(!annual.contains_key(&2019));
        assert!(annual.contains_key(&2020));
    }

    #[test]
    fn empty_series_yields_empty_result() {
        assert!(annualize(&DailySeries::new()).is_empty());
    }
}
