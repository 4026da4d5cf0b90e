//! Parsers and assembly for site dataset bundles.
//!
//! A site ships descriptive metadata, four raw time series tables, and one
//! or more loading schemes. This module parses each piece and merges the
//! tables into the per-variable series the services consume.
//!
//! # Modules
//!
//! - [`info`]: Dataset metadata (site, default loading, display units)
//! - [`loading`]: Variable loading schemes with validation
//! - [`bundle`]: Raw tables, contract checks, and the assembled dataset
//!
//! # Example
//!
//! ```no_run
//! use phi_core::dataset::bundle::{assemble_site_series, parse_tables};
//! use std::path::Path;
//!
//! let tables = parse_tables(Path::new("site_series.json"))
//!     .expect("Failed to parse time series");
//! let series = assemble_site_series(&tables)
//!     .expect("Tables violate the dataset contract");
//! ```

pub mod bundle;
pub mod info;
pub mod loading;

#[cfg(test)]
mod loading_tests;

pub use bundle::{assemble_site_series, SiteDataset, SiteSeries, TimeSeriesTables};
pub use info::DatasetInfo;
pub use loading::{parse_loading_str, validate_loading};
