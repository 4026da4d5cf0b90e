//! Engine configuration file support.
//!
//! This module provides utilities for reading engine configuration from
//! TOML configuration files.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::algorithms::correlation::DEFAULT_WEIGHT_TOLERANCE;
use crate::algorithms::indicator::MissingWeightPolicy;
use crate::core::error::{PhiError, PhiResult};

/// Engine configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub aggregation: AggregationSettings,
    #[serde(default)]
    pub indicator: IndicatorSettings,
    #[serde(default)]
    pub parallel: ParallelSettings,
}

/// Weighted aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationSettings {
    /// Relative tolerance under which two pixel weights are treated as equal
    /// when bounding the mean variance.
    #[serde(default = "default_weight_tolerance")]
    pub weight_tolerance: f64,
}

/// Indicator combination settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSettings {
    /// Rescale by the weight present when variables are missing at a
    /// timestamp, instead of letting the indicator magnitude shrink.
    #[serde(default)]
    pub renormalize_partial: bool,
}

/// Worker pool settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParallelSettings {
    /// Worker threads for per-variable fan-out. Zero means one per core.
    #[serde(default)]
    pub threads: usize,
}

fn default_weight_tolerance() -> f64 {
    DEFAULT_WEIGHT_TOLERANCE
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            weight_tolerance: default_weight_tolerance(),
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(EngineConfig)` if successful
    /// * `Err(PhiError)` if the file cannot be read, parsed, or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> PhiResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            PhiError::Configuration(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse engine configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> PhiResult<Self> {
        let config: EngineConfig = toml::from_str(content).map_err(|e| {
            PhiError::Configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load engine configuration from the default location.
    ///
    /// Searches for `phi.toml` in:
    /// 1. Current directory
    /// 2. Parent directory
    ///
    /// Falls back to the defaults when no file is found.
    pub fn from_default_location() -> PhiResult<Self> {
        let search_paths = vec![PathBuf::from("phi.toml"), PathBuf::from("../phi.toml")];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Check settings for values the engine cannot work with.
    pub fn validate(&self) -> PhiResult<()> {
        let tolerance = self.aggregation.weight_tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 || tolerance >= 1.0 {
            return Err(PhiError::Configuration(format!(
                "aggregation.weight_tolerance must be in (0, 1), got {tolerance}"
            )));
        }
        Ok(())
    }

    /// The configured handling of timestamps with missing variables.
    pub fn missing_weight_policy(&self) -> MissingWeightPolicy {
        if self.indicator.renormalize_partial {
            MissingWeightPolicy::RenormalizePresent
        } else {
            MissingWeightPolicy::PreserveLoadings
        }
    }
}
