use serde::{Deserialize, Serialize};

/// Half-width of a 95% confidence interval in standard deviations.
const CI95_HALF_WIDTH_Z: f64 = 1.96;

/// How a layer's uncertainty band is converted into a per-pixel variance.
///
/// Products report uncertainty in different conventions; the engine needs a
/// variance for every pixel before it can weight anything. Layers with no
/// uncertainty band at all use one of the value-derived models.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum UncertaintyModel {
    /// The band is a one-sigma standard deviation.
    #[default]
    StandardDeviation,
    /// The band is already a variance.
    Variance,
    /// The band is the half-width of a 95% confidence interval.
    ConfidenceInterval95,
    /// No band; the standard deviation is a fixed fraction of the value.
    RelativeStdDev { factor: f64 },
    /// No band; the standard deviation is a constant.
    ConstantStdDev { sigma: f64 },
}

impl UncertaintyModel {
    /// Variance of one pixel given its value and reported uncertainty.
    ///
    /// The value-derived models ignore `uncertainty`; the band models
    /// ignore `value`.
    pub fn variance(&self, value: f64, uncertainty: f64) -> f64 {
        match self {
            Self::StandardDeviation => uncertainty * uncertainty,
            Self::Variance => uncertainty,
            Self::ConfidenceInterval95 => {
                let sigma = uncertainty / CI95_HALF_WIDTH_Z;
                sigma * sigma
            }
            Self::RelativeStdDev { factor } => {
                let sigma = factor * value.abs();
                sigma * sigma
            }
            Self::ConstantStdDev { sigma } => sigma * sigma,
        }
    }
}
