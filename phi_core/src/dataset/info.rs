use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Descriptive metadata shipped alongside a site's time series tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub site_id: String,
    /// Name of the loading scheme to combine with when none is requested.
    pub default_variable_loading_name: String,
    /// Display unit per variable name, used for labelling.
    #[serde(default)]
    pub units: BTreeMap<String, String>,
}

impl DatasetInfo {
    /// Axis label for a variable, `"name (unit)"` when a unit is known.
    pub fn display_label(&self, variable: &str) -> String {
        match self.units.get(variable) {
            Some(unit) => format!("{variable} ({unit})"),
            None => variable.to_string(),
        }
    }
}

/// Parse a dataset info file.
pub fn parse_info(path: &Path) -> Result<DatasetInfo> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset info file: {}", path.display()))?;
    parse_info_str(&content)
        .with_context(|| format!("Failed to parse dataset info file: {}", path.display()))
}

/// Parse dataset info from a JSON string.
///
/// Errors report the JSON path of the offending field, not just the
/// top-level type.
pub fn parse_info_str(json_str: &str) -> Result<DatasetInfo> {
    let mut deserializer = serde_json::Deserializer::from_str(json_str);
    let info: DatasetInfo = serde_path_to_error::deserialize(&mut deserializer)
        .context("Invalid dataset info JSON")?;
    Ok(info)
}
