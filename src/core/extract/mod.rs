//! Extraction phase
//!
//! - [`plan`] - which requests feed which staging collection
//! - [`extractor`] - wave execution and staging replacement

pub mod extractor;
pub mod plan;

pub use extractor::{extract, ExtractSummary, StagedCollection};
