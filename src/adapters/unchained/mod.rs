//! Unchained Engine integration
//!
//! - [`TargetApi`] - what the loader needs from a target
//! - [`UnchainedClient`] - GraphQL login plus `/bulk-import` submission

pub mod client;
pub mod target;

pub use client::UnchainedClient;
pub use target::{EventAck, SubmissionReceipt, TargetApi};
