//! Core domain models for the peat health engine.
//!
//! This module defines the fundamental data structures used throughout the
//! engine, representing variance-carrying observations, aggregation results
//! and variable loadings, together with the engine error taxonomy.

pub mod domain;
pub mod error;

pub use error::{PhiError, PhiResult};
