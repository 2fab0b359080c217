//! Target API abstraction

use crate::domain::errors::TargetError;
use crate::domain::event::Event;
use async_trait::async_trait;
use serde::Deserialize;

/// Per-event acknowledgement, when the target reports one
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventAck {
    /// Identifier the target assigned to the event
    #[serde(rename = "_id", default)]
    pub remote_id: Option<String>,
}

/// What the target answered to a bulk submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionReceipt {
    /// Identifier of the import job, if returned
    pub work_id: Option<String>,

    /// Per-event results; `None` when the target acknowledges the batch as a whole
    pub results: Option<Vec<EventAck>>,
}

impl SubmissionReceipt {
    /// A receipt acknowledging the whole batch under one job id
    pub fn batch(work_id: Option<String>) -> Self {
        Self {
            work_id,
            results: None,
        }
    }

    /// Number of events the target acknowledged out of `submitted`
    pub fn acknowledged(&self, submitted: usize) -> usize {
        self.results.as_ref().map_or(submitted, Vec::len)
    }

    /// Remote id of the event at `index`, falling back to the job id
    pub fn remote_id(&self, index: usize) -> Option<String> {
        self.results
            .as_ref()
            .and_then(|results| results.get(index))
            .and_then(|ack| ack.remote_id.clone())
            .or_else(|| self.work_id.clone())
    }
}

/// Write access to the commerce platform
#[async_trait]
pub trait TargetApi: Send + Sync {
    /// Base URL, for logs
    fn endpoint(&self) -> &str;

    /// Submit a batch of events in one request
    async fn submit_events(&self, events: &[Event]) -> Result<SubmissionReceipt, TargetError>;
}
