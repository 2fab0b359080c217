//! CREATE/UPDATE classification
//!
//! An entity is announced as created when the ledger has never seen it or
//! when it was created after the run's watermark. Everything else is an
//! update.

use crate::adapters::store::{Filter, StagingStore, SUBMITTED_EVENTS_COLLECTION};
use crate::domain::errors::TransformError;
use crate::domain::event::{Entity, Operation};
use crate::domain::record::str_field;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

const LEDGER: &str = "ledger";

/// Payload ids of every previously submitted event, per entity
#[derive(Debug, Clone, Default)]
pub struct LedgerIndex {
    ids: HashMap<Entity, HashSet<String>>,
}

impl LedgerIndex {
    /// Read the whole ledger once
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read or holds a record
    /// without entity or payload id.
    pub async fn load(
        store: &dyn StagingStore,
        batch_size: usize,
    ) -> Result<Self, TransformError> {
        let store_error = |e| TransformError::Store {
            pass: LEDGER.to_string(),
            source: e,
        };

        let mut index = Self::default();
        let mut cursor = store
            .find(SUBMITTED_EVENTS_COLLECTION, Filter::All, batch_size)
            .await
            .map_err(store_error)?;

        while let Some(batch) = cursor.next_batch().await.map_err(store_error)? {
            for record in batch {
                let entity: Entity = record
                    .get("entity")
                    .cloned()
                    .ok_or_else(|| missing("entity"))
                    .and_then(|value| {
                        serde_json::from_value(value).map_err(|e| TransformError::MalformedField {
                            pass: LEDGER.to_string(),
                            field: "entity".to_string(),
                            message: e.to_string(),
                        })
                    })?;
                let id = str_field(&record, "payload._id").ok_or_else(|| missing("payload._id"))?;
                index.insert(entity, id);
            }
        }

        tracing::debug!(entries = index.len(), "Loaded ledger index");
        Ok(index)
    }

    pub fn insert(&mut self, entity: Entity, id: impl Into<String>) {
        self.ids.entry(entity).or_default().insert(id.into());
    }

    /// Whether an event for this entity was ever submitted
    pub fn contains(&self, entity: Entity, id: &str) -> bool {
        self.ids.get(&entity).is_some_and(|ids| ids.contains(id))
    }

    pub fn len(&self) -> usize {
        self.ids.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn missing(field: &str) -> TransformError {
    TransformError::MissingField {
        pass: LEDGER.to_string(),
        field: field.to_string(),
    }
}

/// What a mapping function needs to classify an entity
#[derive(Debug, Clone, Copy)]
pub struct DiffContext<'a> {
    pub since: DateTime<Utc>,
    pub ledger: &'a LedgerIndex,
}

impl<'a> DiffContext<'a> {
    pub fn new(since: DateTime<Utc>, ledger: &'a LedgerIndex) -> Self {
        Self { since, ledger }
    }

    /// Classify an entity
    ///
    /// `created` is `None` for resources without a creation timestamp; they
    /// are classified on the ledger alone.
    pub fn classify(
        &self,
        entity: Entity,
        id: &str,
        created: Option<DateTime<Utc>>,
    ) -> Operation {
        if !self.ledger.contains(entity, id) {
            return Operation::Create;
        }
        match created {
            Some(created) if created > self.since => Operation::Create,
            _ => Operation::Update,
        }
    }
}
