use chrono::{Datelike, NaiveDate};

use crate::core::error::{PhiError, PhiResult};

/// Number of entries in a leap-insensitive year.
pub const DAYS_PER_YEAR: usize = 365;

/// A leap-insensitive day of year in `1..=365`.
///
/// Both 28 and 29 February map to day 59, so every calendar date of any year
/// has an ordinal day and a 365-entry climatology covers all of them.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use phi_core::time::{ordinal_day, OrdinalDay};
///
/// let leap = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
/// let plain = NaiveDate::from_ymd_opt(2021, 2, 28).unwrap();
/// assert_eq!(ordinal_day(leap), OrdinalDay::new(59).unwrap());
/// assert_eq!(ordinal_day(plain), OrdinalDay::new(59).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrdinalDay(u16);

impl OrdinalDay {
    /// Creates an ordinal day, rejecting values outside `1..=365`.
    pub fn new(day: u16) -> PhiResult<Self> {
        if day == 0 || day as usize > DAYS_PER_YEAR {
            return Err(PhiError::Validation(format!(
                "ordinal day must be in 1..=365, got {day}"
            )));
        }
        Ok(Self(day))
    }

    /// Returns the day number in `1..=365`.
    pub fn get(self) -> u16 {
        self.0
    }

    /// Returns the zero-based index into a 365-entry table.
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Ordinal day for a zero-based table index. Callers guarantee the
    /// index is below [`DAYS_PER_YEAR`].
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u16 + 1)
    }
}

impl std::fmt::Display for OrdinalDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns `true` for 29 February of a leap year.
pub fn is_leap_day(date: NaiveDate) -> bool {
    date.month() == 2 && date.day() == 29
}

/// Returns the leap-insensitive ordinal day of a date.
///
/// Non-leap years keep their calendar ordinal. In leap years, dates after
/// February shift back by one and 29 February maps to day 59, the same entry
/// as 28 February.
pub fn ordinal_day(date: NaiveDate) -> OrdinalDay {
    let ordinal = date.ordinal() as u16;
    if !date.leap_year() {
        OrdinalDay(ordinal)
    } else if date.month() > 2 {
        OrdinalDay(ordinal - 1)
    } else if is_leap_day(date) {
        OrdinalDay(59)
    } else {
        OrdinalDay(ordinal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn non_leap_year_keeps_calendar_ordinal() {
        assert_eq!(ordinal_day(date(2021, 1, 1)).get(), 1);
        assert_eq!(ordinal_day(date(2021, 2, 28)).get(), 59);
        assert_eq!(ordinal_day(date(2021, 3, 1)).get(), 60);
        assert_eq!(ordinal_day(date(2021, 12, 31)).get(), 365);
    }

    #[test]
    fn leap_dates_share_day_59_and_shift_after_february() {
        assert_eq!(ordinal_day(date(2020, 2, 28)).get(), 59);
        assert_eq!(ordinal_day(date(2020, 2, 29)).get(), 59);
        assert_eq!(ordinal_day(date(2020, 3, 1)).get(), 60);
        assert_eq!(ordinal_day(date(2020, 12, 31)).get(), 365);
    }

    #[test]
    fn leap_dates_before_february_are_unshifted() {
        assert_eq!(ordinal_day(date(2020, 1, 1)).get(), 1);
        assert_eq!(ordinal_day(date(2020, 2, 1)).get(), 32);
    }

    #[test]
    fn same_calendar_day_matches_across_year_kinds() {
        // 1 July must land on the same entry in leap and non-leap years
        assert_eq!(
            ordinal_day(date(2020, 7, 1)).get(),
            ordinal_day(date(2021, 7, 1)).get()
        );
    }

    #[test]
    fn leap_day_detection() {
        assert!(is_leap_day(date(2020, 2, 29)));
        assert!(!is_leap_day(date(2020, 2, 28)));
        assert!(!is_leap_day(date(2020, 3, 29)));
    }

    #[test]
    fn ordinal_day_bounds_are_enforced() {
        assert!(OrdinalDay::new(0).is_err());
        assert!(OrdinalDay::new(366).is_err());
        assert_eq!(OrdinalDay::new(365).unwrap().index(), 364);
    }
}
