//! In-memory collaborators for unit tests

use crate::adapters::akeneo::{FetchRequest, Resource, SourceApi};
use crate::adapters::store::{MemoryStore, StagingStore};
use crate::adapters::unchained::{SubmissionReceipt, TargetApi};
use crate::core::journal::{CompletionStatus, JournalEntry};
use crate::core::sync::{RunContext, RunSettings};
use crate::domain::errors::{SourceError, TargetError};
use crate::domain::event::Event;
use crate::domain::ids::RunId;
use crate::domain::record::Document;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeSource {
    pub responses: HashMap<Resource, Vec<Document>>,
    pub failing: Option<Resource>,
    pub blocking: Option<Resource>,
    pub requests: Mutex<Vec<FetchRequest>>,
}

impl FakeSource {
    pub fn with(mut self, resource: Resource, docs: Vec<Document>) -> Self {
        self.responses.insert(resource, docs);
        self
    }

    pub fn failing_on(mut self, resource: Resource) -> Self {
        self.failing = Some(resource);
        self
    }

    /// Never answer requests for `resource`
    pub fn blocking_on(mut self, resource: Resource) -> Self {
        self.blocking = Some(resource);
        self
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceApi for FakeSource {
    fn endpoint(&self) -> &str {
        "memory://akeneo"
    }

    async fn fetch_all(&self, request: &FetchRequest) -> Result<Vec<Document>, SourceError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.blocking.as_ref() == Some(&request.resource) {
            std::future::pending::<()>().await;
        }
        if self.failing.as_ref() == Some(&request.resource) {
            return Err(SourceError::RequestFailed {
                url: request.resource.path(),
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(self
            .responses
            .get(&request.resource)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeTarget {
    pub fail: bool,
    pub receipt: Option<SubmissionReceipt>,
    pub submissions: Mutex<Vec<Vec<Event>>>,
}

impl FakeTarget {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn submissions(&self) -> Vec<Vec<Event>> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl TargetApi for FakeTarget {
    fn endpoint(&self) -> &str {
        "memory://unchained"
    }

    async fn submit_events(&self, events: &[Event]) -> Result<SubmissionReceipt, TargetError> {
        if self.fail {
            return Err(TargetError::RequestFailed {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        self.submissions.lock().unwrap().push(events.to_vec());
        Ok(self
            .receipt
            .clone()
            .unwrap_or_else(|| SubmissionReceipt::batch(Some("work-1".to_string()))))
    }
}

pub fn entry(since: DateTime<Utc>) -> JournalEntry {
    JournalEntry {
        run_id: RunId::generate(),
        since,
        started_at: Utc::now(),
        status: CompletionStatus::Running,
    }
}

pub fn context(
    store: &MemoryStore,
    source: Arc<FakeSource>,
    target: Arc<FakeTarget>,
    since: DateTime<Utc>,
) -> RunContext {
    let store: Arc<dyn StagingStore> = Arc::new(store.clone());
    RunContext::new(store, source, target, entry(since), RunSettings::default())
}
