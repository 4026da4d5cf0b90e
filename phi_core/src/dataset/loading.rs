use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::core::domain::VariableLoading;

/// Parse a variable loading file.
pub fn parse_loading(path: &Path) -> Result<VariableLoading> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read loading file: {}", path.display()))?;
    parse_loading_str(&content)
        .with_context(|| format!("Failed to parse loading file: {}", path.display()))
}

/// Parse a variable loading scheme from a JSON string and validate it.
pub fn parse_loading_str(json_str: &str) -> Result<VariableLoading> {
    let mut deserializer = serde_json::Deserializer::from_str(json_str);
    let loading: VariableLoading = serde_path_to_error::deserialize(&mut deserializer)
        .context("Invalid variable loading JSON")?;
    validate_loading(&loading)?;
    Ok(loading)
}

/// Check a loading scheme for values the engine cannot work with.
///
/// Coefficients must be finite and within `[-1, 1]`; optimal values must be
/// finite. An all-zero scheme passes here and is rejected at combination
/// time, where the indicator name is known to the caller.
pub fn validate_loading(loading: &VariableLoading) -> Result<()> {
    if loading.variable_loadings.is_empty() {
        bail!("loading '{}' names no variables", loading.name);
    }
    for (variable, &coefficient) in &loading.variable_loadings {
        if !coefficient.is_finite() {
            bail!(
                "loading '{}' has a non-finite coefficient for variable '{}'",
                loading.name,
                variable
            );
        }
        if !(-1.0..=1.0).contains(&coefficient) {
            bail!(
                "loading '{}' has coefficient {} for variable '{}', outside [-1, 1]",
                loading.name,
                coefficient,
                variable
            );
        }
    }
    for (variable, &optimal) in &loading.optimal_values {
        if !optimal.is_finite() {
            bail!(
                "loading '{}' has a non-finite optimal value for variable '{}'",
                loading.name,
                variable
            );
        }
    }
    Ok(())
}
