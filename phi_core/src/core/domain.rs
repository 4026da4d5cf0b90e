//! Domain models for site-level peat health statistics.
//!
//! This module provides the core data structures shared by the statistical
//! engine: variance-carrying samples, masked pixel collections, resampling
//! ratios, aggregation results and variable loadings.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{PhiError, PhiResult};

/// A single observation paired with its variance.
///
/// `Sample` is the universal unit of the engine: in raster context it is one
/// sub-pixel drawn from inside the peat extent, in climatology context it is
/// one (mean, variance) point of a time series. The weight of a sample is the
/// inverse of its variance.
///
/// # Examples
///
/// ```
/// use phi_core::core::domain::Sample;
///
/// let sample = Sample::new(2.0, 0.25);
/// assert_eq!(sample.weight(), 4.0);
/// assert!(sample.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub value: f64,
    pub variance: f64,
}

impl Sample {
    /// Creates a new sample from a value and its variance.
    pub fn new(value: f64, variance: f64) -> Self {
        Self { value, variance }
    }

    /// Returns the inverse-variance weight of this sample.
    ///
    /// The weight is derived on the fly and never stored.
    pub fn weight(&self) -> f64 {
        1.0 / self.variance
    }

    /// Returns `true` if this sample can contribute to an aggregation.
    ///
    /// A sample is valid when its value is finite and its weight is finite
    /// and strictly positive. This single check covers non-finite values as
    /// well as zero, negative and non-finite variances.
    ///
    /// # Examples
    ///
    /// ```
    /// use phi_core::core::domain::Sample;
    ///
    /// assert!(Sample::new(1.0, 0.5).is_valid());
    /// assert!(!Sample::new(f64::NAN, 0.5).is_valid());
    /// assert!(!Sample::new(1.0, 0.0).is_valid());
    /// assert!(!Sample::new(1.0, -2.0).is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        let weight = self.weight();
        self.value.is_finite() && weight.is_finite() && weight > 0.0
    }
}

impl From<WeightedStat> for Sample {
    /// Reinterprets an aggregation result as a sample for a further
    /// aggregation, as done when building climatologies from series points.
    fn from(stat: WeightedStat) -> Self {
        Self::new(stat.mean, stat.variance)
    }
}

/// An ordered collection of samples drawn from inside the peat extent.
///
/// The set preserves the row-major layer order of the source raster so that
/// aggregation results are reproducible. Invalid samples are kept and only
/// filtered when an aggregation runs.
///
/// # Examples
///
/// ```
/// use phi_core::core::domain::{MaskedPixelSet, Sample};
///
/// let pixels = MaskedPixelSet::new(vec![
///     Sample::new(1.0, 0.5),
///     Sample::new(2.0, 0.5),
/// ]);
/// assert_eq!(pixels.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskedPixelSet {
    samples: Vec<Sample>,
}

impl MaskedPixelSet {
    /// Creates a pixel set from samples in layer order.
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Returns the samples in layer order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Returns the number of samples, valid or not.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if the set holds no samples at all.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The number of sub-pixels contained in one native pixel of a resampled
/// product.
///
/// Products are stored on a common fine grid; a coarser native product covers
/// several grid cells per original measurement, and those cells are maximally
/// correlated. A ratio of one means the product was not resampled.
///
/// The ratio arrives as floating point metadata and must be a positive whole
/// number; anything else is rejected at construction.
///
/// # Examples
///
/// ```
/// use phi_core::core::domain::ResamplingRatio;
///
/// let ratio = ResamplingRatio::new(25).unwrap();
/// assert_eq!(ratio.get(), 25);
///
/// assert!(ResamplingRatio::try_from(625.0).is_ok());
/// assert!(ResamplingRatio::try_from(0.75).is_err());
/// assert!(ResamplingRatio::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ResamplingRatio(u32);

impl ResamplingRatio {
    /// Creates a ratio from a sub-pixel count per native pixel.
    pub fn new(ratio: u32) -> PhiResult<Self> {
        if ratio == 0 {
            return Err(PhiError::InvalidResamplingRatio(
                "ratio must be at least 1".to_string(),
            ));
        }
        Ok(Self(ratio))
    }

    /// Returns the sub-pixel count per native pixel.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Returns `true` if the product was not resampled.
    pub fn is_unit(self) -> bool {
        self.0 == 1
    }
}

impl TryFrom<f64> for ResamplingRatio {
    type Error = PhiError;

    /// Validates a ratio taken from floating point product metadata.
    fn try_from(ratio: f64) -> PhiResult<Self> {
        if !ratio.is_finite() || ratio < 1.0 {
            return Err(PhiError::InvalidResamplingRatio(format!(
                "ratio must be a positive whole number, got {ratio}"
            )));
        }
        if ratio.fract() != 0.0 || ratio > u32::MAX as f64 {
            return Err(PhiError::InvalidResamplingRatio(format!(
                "ratio must be a whole number of sub-pixels, got {ratio}"
            )));
        }
        Self::new(ratio as u32)
    }
}

impl From<ResamplingRatio> for f64 {
    fn from(ratio: ResamplingRatio) -> f64 {
        ratio.0 as f64
    }
}

/// The result of an inverse-variance weighted aggregation.
///
/// `count` records how many valid samples contributed. Aggregations over zero
/// valid samples never produce a stat; they fail with
/// [`PhiError::InsufficientData`](super::error::PhiError) instead.
///
/// # Examples
///
/// ```
/// use phi_core::core::domain::WeightedStat;
///
/// let stat = WeightedStat::new(3.5, 0.25, 12);
/// assert_eq!(stat.std_dev(), 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedStat {
    pub mean: f64,
    pub variance: f64,
    pub count: usize,
}

impl WeightedStat {
    /// Creates an aggregation result.
    pub fn new(mean: f64, variance: f64, count: usize) -> Self {
        Self {
            mean,
            variance,
            count,
        }
    }

    /// Returns the standard deviation implied by the variance.
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// A time series of aggregation results keyed by calendar date.
///
/// The map holds strictly increasing unique dates; assemblers reject
/// duplicate timestamps before building one.
pub type DailySeries = BTreeMap<NaiveDate, WeightedStat>;

/// A time series of aggregation results keyed by calendar year.
pub type AnnualSeries = BTreeMap<i32, WeightedStat>;

/// An expert-authored combination recipe for the peat health indicator.
///
/// Loadings are signed coefficients in `[-1, 1]`, one per variable. The
/// presence of a variable in `optimal_values` indicates that its series
/// should be transformed to the absolute deviation from that value before
/// any climatology is built.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use phi_core::core::domain::VariableLoading;
///
/// let loading = VariableLoading {
///     name: "expert".to_string(),
///     description: "Expert opinion".to_string(),
///     optimal_values: BTreeMap::from([("water_level".to_string(), -0.1)]),
///     variable_loadings: BTreeMap::from([
///         ("water_level".to_string(), -1.0),
///         ("lai".to_string(), 0.5),
///     ]),
/// };
///
/// assert_eq!(loading.loading("lai"), Some(0.5));
/// assert_eq!(loading.optimal_value("water_level"), Some(-0.1));
/// assert_eq!(loading.optimal_value("lai"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableLoading {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub optimal_values: BTreeMap<String, f64>,
    pub variable_loadings: BTreeMap<String, f64>,
}

impl VariableLoading {
    /// Returns the loading coefficient for a variable, if one is named.
    pub fn loading(&self, variable: &str) -> Option<f64> {
        self.variable_loadings.get(variable).copied()
    }

    /// Returns the optimal value for a variable, if one is configured.
    pub fn optimal_value(&self, variable: &str) -> Option<f64> {
        self.optimal_values.get(variable).copied()
    }
}
