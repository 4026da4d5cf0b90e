//! Statistical algorithms for the health indicator pipeline.
//!
//! This module provides the uncertainty-aware aggregation, climatological
//! baselines, anomaly scoring, and loading-weighted combination the engine
//! is built from.
//!
//! # Components
//!
//! - [`aggregation`]: Inverse-variance weighted means over pixel samples
//! - [`correlation`]: Upper bounds on the mean variance under spatial correlation
//! - [`climatology`]: Daily and annual climatological baselines
//! - [`anomaly`]: Z-score standardization against those baselines
//! - [`indicator`]: Loading-weighted combination into the indicator series
//!
//! # Example
//!
//! ```ignore
//! use phi_core::algorithms::{weighted_mean, upper_bound_variance};
//!
//! let stat = weighted_mean(&samples)?;
//! let bound = upper_bound_variance(&samples, Some(ratio))?;
//! println!("mean {:.3} +/- {:.3}", stat.mean, bound.sqrt());
//! ```

pub mod aggregation;
pub mod anomaly;
pub mod climatology;
pub mod correlation;
pub mod indicator;

pub use aggregation::{weighted_mean, weighted_mean_of_pixels};
pub use anomaly::{annual_zscores, daily_zscores, optimal_deviation, zscore, ZScoreSeries};
pub use climatology::{
    annual_climatology, annual_envelope, climatology_envelope, daily_climatology,
    ClimatologyBand, DailyClimatology,
};
pub use correlation::{
    upper_bound_variance, upper_bound_variance_with, DEFAULT_WEIGHT_TOLERANCE,
};
pub use indicator::{
    combine_series, normalized_weights, MissingWeightPolicy, PhiPoint, PhiSeries,
};
