//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through a sync run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sync run identifier newtype wrapper
///
/// Every pipeline invocation gets a fresh run id; journal records and ledger
/// entries written by that run carry it.
///
/// # Examples
///
/// ```
/// use pimbridge::domain::ids::RunId;
///
/// let run_id = RunId::generate();
/// assert!(!run_id.as_str().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Creates a RunId from an existing string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Run ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Generates a new random RunId
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the run ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Submitted event identifier
///
/// Format: `{ENTITY}:{payload_id}`, e.g. `PRODUCT:12345`. Unique because a
/// payload `_id` is unique within its entity type.
///
/// # Examples
///
/// ```
/// use pimbridge::domain::ids::EventId;
/// use std::str::FromStr;
///
/// let id = EventId::from_str("ASSORTMENT:channel.ecommerce").unwrap();
/// assert_eq!(id.entity(), "ASSORTMENT");
/// assert_eq!(id.payload_id(), "channel.ecommerce");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(String);

impl EventId {
    /// Creates an EventId from its entity and payload id parts
    pub fn from_parts(entity: &str, payload_id: &str) -> Self {
        Self(format!("{entity}:{payload_id}"))
    }

    /// Returns the event ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The entity part (before the first `:`)
    pub fn entity(&self) -> &str {
        self.0.split(':').next().unwrap_or(&self.0)
    }

    /// The payload id part (after the first `:`)
    pub fn payload_id(&self) -> &str {
        self.0.split_once(':').map(|(_, id)| id).unwrap_or("")
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((entity, id)) if !entity.is_empty() && !id.is_empty() => Ok(Self(s.to_string())),
            _ => Err(format!(
                "Invalid event ID format. Expected {{ENTITY}}:{{payload_id}}, got: {s}"
            )),
        }
    }
}

impl TryFrom<String> for EventId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.0
    }
}
