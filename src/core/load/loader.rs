//! Submission of the event log
//!
//! The whole log goes out as one batch. Only once the target accepted it are
//! the events appended to the ledger, so a failed submission leaves the
//! ledger untouched and the run can simply be repeated.

use crate::adapters::store::{Filter, StagingStore, SUBMITTED_EVENTS_COLLECTION};
use crate::core::sync::RunContext;
use crate::core::transform::{event_collection, PASS_ORDER};
use crate::domain::errors::{LoadError, StoreError};
use crate::domain::event::{Event, SubmittedEventRecord};
use crate::domain::ids::EventId;
use chrono::Utc;

/// Read every pass log, in pass order
///
/// # Errors
///
/// Returns an error if a log cannot be read or holds an event that does not
/// decode or has no payload `_id`.
pub async fn read_event_log(
    store: &dyn StagingStore,
    batch_size: usize,
) -> Result<Vec<Event>, LoadError> {
    let mut events = Vec::new();
    for pass in PASS_ORDER {
        let collection = event_collection(pass);
        let mut cursor = store
            .find(&collection, Filter::All, batch_size)
            .await
            .map_err(LoadError::EventLog)?;

        while let Some(batch) = cursor.next_batch().await.map_err(LoadError::EventLog)? {
            for doc in batch {
                let event: Event =
                    serde_json::from_value(doc).map_err(|e| LoadError::InvalidEvent {
                        collection: collection.clone(),
                        message: e.to_string(),
                    })?;
                if event.payload_id().is_none() {
                    return Err(LoadError::InvalidEvent {
                        collection: collection.clone(),
                        message: "event payload has no _id".to_string(),
                    });
                }
                events.push(event);
            }
        }
    }
    Ok(events)
}

/// Submit the event log and record it in the ledger
///
/// # Returns
///
/// Ids of the submitted events, in submission order. An empty log submits
/// nothing and returns an empty list.
///
/// # Errors
///
/// - [`LoadError::Submission`] if the target refused the batch
/// - [`LoadError::Mismatch`] if the target acknowledged a different number
///   of events
/// - [`LoadError::Ledger`] if the ledger append failed after submission
pub async fn load(context: &RunContext) -> Result<Vec<EventId>, LoadError> {
    let store = context.store.as_ref();
    let events = read_event_log(store, context.settings.batch_size).await?;

    if events.is_empty() {
        tracing::info!(run_id = %context.run_id(), "Event log is empty, nothing to submit");
        return Ok(Vec::new());
    }

    tracing::info!(
        run_id = %context.run_id(),
        events = events.len(),
        target = context.target.endpoint(),
        "Submitting events"
    );
    let receipt = context.target.submit_events(&events).await?;

    let acknowledged = receipt.acknowledged(events.len());
    if acknowledged != events.len() {
        return Err(LoadError::Mismatch {
            submitted: events.len(),
            acknowledged,
        });
    }

    let submitted_at = Utc::now();
    let mut ids = Vec::with_capacity(events.len());
    let mut records = Vec::with_capacity(events.len());
    for (index, event) in events.into_iter().enumerate() {
        if let Some(id) = event.id() {
            ids.push(id);
        }
        let record = SubmittedEventRecord::new(
            event,
            context.run_id().clone(),
            submitted_at,
            receipt.remote_id(index),
        );
        let doc = serde_json::to_value(&record).map_err(|e| {
            LoadError::Ledger(StoreError::WriteFailed {
                collection: SUBMITTED_EVENTS_COLLECTION.to_string(),
                message: e.to_string(),
            })
        })?;
        records.push(doc);
    }

    store
        .bulk_insert_unordered(SUBMITTED_EVENTS_COLLECTION, records)
        .await
        .map_err(LoadError::Ledger)?;

    tracing::info!(
        run_id = %context.run_id(),
        events = ids.len(),
        work_id = receipt.work_id.as_deref().unwrap_or("-"),
        "Events recorded in ledger"
    );
    Ok(ids)
}
