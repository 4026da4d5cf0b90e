use chrono::Duration;

use crate::core::domain::{DailySeries, WeightedStat};

/// Fill the gaps of a sparse daily series by linear interpolation.
///
/// Both the mean and the variance are interpolated linearly between
/// consecutive observations, matching how gridded products are densified
/// upstream. Interpolated entries carry a sample count of zero so that
/// synthetic days stay distinguishable from observed ones. Nothing is
/// extrapolated beyond the first and last observation.
///
/// # Arguments
/// * `series` - Observed daily series, possibly sparse
///
/// # Returns
/// A series with one entry per day between the first and last observation.
pub fn interpolate_daily(series: &DailySeries) -> DailySeries {
    if series.len() <= 1 {
        return series.clone();
    }

    let mut filled = series.clone();
    let knots: Vec<_> = series.iter().map(|(&date, &stat)| (date, stat)).collect();

    for window in knots.windows(2) {
        let (start_date, start) = window[0];
        let (end_date, end) = window[1];
        let gap = (end_date - start_date).num_days();

        for offset in 1..gap {
            let t = offset as f64 / gap as f64;
            let mean = start.mean + t * (end.mean - start.mean);
            let variance = start.variance + t * (end.variance - start.variance);
            filled.insert(
                start_date + Duration::days(offset),
                WeightedStat::new(mean, variance, 0),
            );
        }
    }

    filled
}
