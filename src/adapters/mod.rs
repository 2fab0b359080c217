//! External system integrations for pimbridge.
//!
//! - [`akeneo`] - Source PIM (REST, OAuth password grant)
//! - [`unchained`] - Target commerce engine (GraphQL login, bulk import)
//! - [`store`] - Staging store abstraction and in-memory backend
//! - [`postgresql`] - PostgreSQL staging store backend
//!
//! # Design Pattern
//!
//! Every external system sits behind a trait ([`akeneo::SourceApi`],
//! [`unchained::TargetApi`], [`store::StagingStore`]) so the pipeline can be
//! exercised with in-memory implementations.

pub mod akeneo;
pub mod postgresql;
pub mod store;
pub mod unchained;
