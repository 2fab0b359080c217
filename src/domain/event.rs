//! Change events and ledger records
//!
//! An [`Event`] is what the transform passes emit and the loader submits to the
//! commerce platform. A [`SubmittedEventRecord`] is the same event after a
//! successful submission, as stored in the ledger.

use crate::domain::ids::{EventId, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Entity type an event applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Entity {
    Product,
    Assortment,
    Filter,
}

impl Entity {
    /// Wire name of the entity
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "PRODUCT",
            Self::Assortment => "ASSORTMENT",
            Self::Filter => "FILTER",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation requested by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Create,
    Update,
}

impl Operation {
    /// Wire name of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change event for the bulk-import endpoint
///
/// The payload is an arbitrary JSON object; its `_id` identifies the entity.
///
/// # Examples
///
/// ```
/// use pimbridge::domain::event::{Entity, Event, Operation};
/// use serde_json::json;
///
/// let event = Event::new(Entity::Product, Operation::Create, json!({"_id": "sku-1"}));
/// assert_eq!(event.payload_id(), Some("sku-1"));
/// assert_eq!(event.id().unwrap().as_str(), "PRODUCT:sku-1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub entity: Entity,
    pub operation: Operation,
    pub payload: Value,
}

impl Event {
    /// Create a new event
    pub fn new(entity: Entity, operation: Operation, payload: Value) -> Self {
        Self {
            entity,
            operation,
            payload,
        }
    }

    /// The payload `_id`, if present and a string
    pub fn payload_id(&self) -> Option<&str> {
        self.payload.get("_id").and_then(Value::as_str)
    }

    /// The event id, if the payload carries an `_id`
    pub fn id(&self) -> Option<EventId> {
        self.payload_id()
            .map(|id| EventId::from_parts(self.entity.as_str(), id))
    }
}

/// A ledger entry: an event that was accepted by the target platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedEventRecord {
    pub entity: Entity,
    pub operation: Operation,
    pub payload: Value,

    /// Run that submitted the event
    pub run_id: RunId,

    /// When the submission was acknowledged
    pub submitted_at: DateTime<Utc>,

    /// Identifier assigned by the target, when it reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

impl SubmittedEventRecord {
    /// Wrap a submitted event with its submission metadata
    pub fn new(
        event: Event,
        run_id: RunId,
        submitted_at: DateTime<Utc>,
        remote_id: Option<String>,
    ) -> Self {
        Self {
            entity: event.entity,
            operation: event.operation,
            payload: event.payload,
            run_id,
            submitted_at,
            remote_id,
        }
    }

    /// The payload `_id`, if present
    pub fn payload_id(&self) -> Option<&str> {
        self.payload.get("_id").and_then(Value::as_str)
    }
}
