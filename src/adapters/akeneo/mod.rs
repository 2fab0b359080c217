//! Akeneo PIM integration
//!
//! - [`SourceApi`] - what the extractor needs from a source
//! - [`AkeneoClient`] - REST implementation (OAuth password grant, HAL paging)
//! - [`Resource`] / [`FetchRequest`] - the list endpoints and how to query them

pub mod client;
pub mod models;
pub mod source;

pub use client::AkeneoClient;
pub use models::{FetchRequest, Resource};
pub use source::SourceApi;
