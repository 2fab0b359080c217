//! Transform phase
//!
//! Turns the staged snapshot into change events. Passes run in a fixed
//! order, each writing its own event log:
//!
//! - [`products`] - products and product models
//! - [`associations`] - product groups built from associations
//! - [`taxonomy`] - category assortments
//! - [`channels`] - channel root assortments
//!
//! The ledger is read once per run and shared by every pass through
//! [`diff::DiffContext`].

pub mod associations;
pub mod bulk;
pub mod channels;
pub mod diff;
pub mod pass;
pub mod products;
pub mod taxonomy;

pub use diff::{DiffContext, LedgerIndex};
pub use pass::{event_collection, run_pass, MappingPass, PassSource};

use crate::core::sync::RunContext;
use crate::domain::errors::TransformError;
use std::time::{Duration, Instant};

/// Pass names in execution order; the loader reads the logs in this order too
pub const PASS_ORDER: [&str; 4] = [
    products::PASS_NAME,
    associations::PASS_NAME,
    taxonomy::PASS_NAME,
    channels::PASS_NAME,
];

/// Events written per pass
#[derive(Debug, Clone, Default)]
pub struct TransformSummary {
    pub passes: Vec<(&'static str, usize)>,
    pub duration: Duration,
}

impl TransformSummary {
    pub fn total_events(&self) -> usize {
        self.passes.iter().map(|(_, events)| events).sum()
    }

    /// Events written by `pass`
    pub fn events(&self, pass: &str) -> Option<usize> {
        self.passes
            .iter()
            .find(|(name, _)| *name == pass)
            .map(|(_, events)| *events)
    }

    pub fn log_summary(&self) {
        tracing::info!(
            products = self.events(products::PASS_NAME).unwrap_or(0),
            associations = self.events(associations::PASS_NAME).unwrap_or(0),
            taxonomy = self.events(taxonomy::PASS_NAME).unwrap_or(0),
            channels = self.events(channels::PASS_NAME).unwrap_or(0),
            total = self.total_events(),
            duration_ms = self.duration.as_millis() as u64,
            "Transform summary"
        );
    }
}

/// Run every mapping pass over the current staging snapshot
///
/// # Errors
///
/// Returns the first pass failure. Logs of passes that already ran keep
/// their events; the next run clears them again.
pub async fn transform(context: &RunContext) -> Result<TransformSummary, TransformError> {
    let start = Instant::now();
    let ledger = LedgerIndex::load(context.store.as_ref(), context.settings.batch_size).await?;

    tracing::info!(
        run_id = %context.run_id(),
        since = %context.since().to_rfc3339(),
        incremental = context.settings.incremental,
        ledger_entries = ledger.len(),
        "Starting transform"
    );

    let products_pass = products::ProductsPass::new(
        context.settings.incremental.then(|| context.since()),
    );

    let mut summary = TransformSummary::default();
    summary.passes.push((
        products::PASS_NAME,
        run_pass(&products_pass, context, &ledger).await?,
    ));
    summary.passes.push((
        associations::PASS_NAME,
        run_pass(&associations::AssociationsPass, context, &ledger).await?,
    ));
    summary.passes.push((
        taxonomy::PASS_NAME,
        run_pass(&taxonomy::TaxonomyPass, context, &ledger).await?,
    ));
    summary.passes.push((
        channels::PASS_NAME,
        run_pass(&channels::ChannelsPass, context, &ledger).await?,
    ));

    summary.duration = start.elapsed();
    Ok(summary)
}
