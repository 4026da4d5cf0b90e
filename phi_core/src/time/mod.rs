pub mod ordinal;

pub use ordinal::{is_leap_day, ordinal_day, OrdinalDay, DAYS_PER_YEAR};
