//! Series reshaping between temporal resolutions.
//!
//! # Modules
//!
//! - [`interpolation`]: Densify sparse daily series by linear interpolation
//! - [`resampling`]: Collapse daily series into annual ones

pub mod interpolation;
pub mod resampling;

pub use interpolation::interpolate_daily;
pub use resampling::annualize;
