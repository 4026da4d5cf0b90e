//! Service layer for orchestration of the statistical pipeline.
//!
//! Services tie the algorithms together into the flows callers actually
//! run: extracting series from rasters, analyzing single variables, and
//! computing the combined indicator for a whole site.

pub mod phi;
pub mod series;
pub mod variable;

pub use phi::{compute_annual_phi, compute_daily_phi, AnnualPhiReport, DailyPhiReport, ProcessingMode};
pub use series::{build_variable_series, RasterSnapshot, VariableSeries};
pub use variable::{analyze_annual_variable, analyze_daily_variable, AnnualVariableReport, VariableReport};
