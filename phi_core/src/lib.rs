//! Statistical engine for the peat health indicator.
//!
//! Reduces uncertainty-carrying environmental time series to standardized
//! anomalies and combines them, per site, into a single health indicator.
//! The algorithms propagate measurement variance end to end: zone means are
//! inverse-variance weighted, their variance is bounded under spatial
//! correlation, and climatological baselines carry their own spread.

pub mod algorithms;
pub mod config;
pub mod core;
pub mod dataset;
pub mod preprocessing;
pub mod services;
pub mod time;
pub mod transformations;
