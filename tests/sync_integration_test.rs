//! End-to-end sync runs over the in-memory staging store
//!
//! The PIM and the engine are replaced by in-process fakes; everything in
//! between (journal, extraction, the four passes, the loader and the ledger)
//! is the real pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pimbridge::adapters::akeneo::{FetchRequest, Resource, SourceApi};
use pimbridge::adapters::store::{
    staging_collection, MemoryStore, StagingStore, SUBMITTED_EVENTS_COLLECTION,
};
use pimbridge::adapters::unchained::{SubmissionReceipt, TargetApi};
use pimbridge::core::journal::{CompletionStatus, JournalEntry};
use pimbridge::core::sync::{RunContext, RunSettings, SyncCoordinator};
use pimbridge::core::transform::{event_collection, transform};
use pimbridge::domain::errors::{SourceError, TargetError};
use pimbridge::domain::{Entity, Event, Operation, RunId, SyncError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CatalogSource {
    resources: Mutex<HashMap<Resource, Vec<Value>>>,
}

impl CatalogSource {
    fn set(&self, resource: Resource, docs: Vec<Value>) {
        self.resources.lock().unwrap().insert(resource, docs);
    }
}

#[async_trait]
impl SourceApi for CatalogSource {
    fn endpoint(&self) -> &str {
        "memory://akeneo"
    }

    async fn fetch_all(&self, request: &FetchRequest) -> Result<Vec<Value>, SourceError> {
        Ok(self
            .resources
            .lock()
            .unwrap()
            .get(&request.resource)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
struct RecordingTarget {
    down: AtomicBool,
    batches: Mutex<Vec<Vec<Event>>>,
}

impl RecordingTarget {
    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn last_batch(&self) -> Vec<Event> {
        self.batches.lock().unwrap().last().cloned().unwrap_or_default()
    }

    fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl TargetApi for RecordingTarget {
    fn endpoint(&self) -> &str {
        "memory://unchained"
    }

    async fn submit_events(&self, events: &[Event]) -> Result<SubmissionReceipt, TargetError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(TargetError::ConnectionFailed("connection refused".to_string()));
        }
        self.batches.lock().unwrap().push(events.to_vec());
        Ok(SubmissionReceipt::batch(Some("work-1".to_string())))
    }
}

struct Harness {
    store: MemoryStore,
    source: Arc<CatalogSource>,
    target: Arc<RecordingTarget>,
    coordinator: SyncCoordinator,
}

impl Harness {
    fn new() -> Self {
        Self::with_settings(RunSettings::default())
    }

    fn with_settings(settings: RunSettings) -> Self {
        let store = MemoryStore::new();
        let source = Arc::new(CatalogSource::default());
        let target = Arc::new(RecordingTarget::default());
        let coordinator = SyncCoordinator::new(
            Arc::new(store.clone()),
            Arc::clone(&source) as Arc<dyn SourceApi>,
            Arc::clone(&target) as Arc<dyn TargetApi>,
            settings,
        );
        Self {
            store,
            source,
            target,
            coordinator,
        }
    }

    fn with_catalog(self) -> Self {
        self.source.set(
            Resource::Products,
            vec![product("sku-1", "2020-01-01T00:00:00+00:00", &["shoes"])],
        );
        self.source.set(
            Resource::Categories,
            vec![
                category("master", None),
                category("shoes", Some("master")),
                category("clearance", Some("master")),
                category("orphan", None),
            ],
        );
        self.source.set(
            Resource::Channels,
            vec![json!({
                "code": "ecommerce",
                "locales": ["de_CH"],
                "currencies": ["CHF"],
                "category_tree": "master",
                "labels": {"de_CH": "Webshop"}
            })],
        );
        self
    }

    async fn ledger_len(&self) -> usize {
        self.store.count(SUBMITTED_EVENTS_COLLECTION).await
    }
}

fn product(identifier: &str, created: &str, categories: &[&str]) -> Value {
    json!({
        "identifier": identifier,
        "family": "footwear",
        "categories": categories,
        "created": created,
        "updated": created,
        "values": {
            "name": [{"scope": null, "locale": "de_CH", "data": format!("Name {identifier}")}],
            "price": [{"scope": null, "locale": null, "data": [{"amount": "49.90", "currency": "CHF"}]}]
        },
        "associations": {}
    })
}

fn category(code: &str, parent: Option<&str>) -> Value {
    json!({"code": code, "parent": parent, "labels": {"de_CH": code.to_uppercase()}})
}

fn operation_of(events: &[Event], entity: Entity, id: &str) -> Option<Operation> {
    find(events, entity, id).map(|e| e.operation)
}

fn find<'a>(events: &'a [Event], entity: Entity, id: &str) -> Option<&'a Event> {
    events
        .iter()
        .find(|e| e.entity == entity && e.payload_id() == Some(id))
}

/// `field` of every entry in a payload list, e.g. the ids of linked products
fn linked(event: &Event, list: &str, field: &str) -> Vec<String> {
    event.payload[list]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item[field].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_first_run_creates_catalog() {
    let harness = Harness::new().with_catalog();

    let summary = harness.coordinator.run(false).await.unwrap();
    assert_eq!(summary.status, CompletionStatus::Complete);
    assert_eq!(summary.since, DateTime::<Utc>::UNIX_EPOCH);

    let events = harness.target.last_batch();
    assert_eq!(operation_of(&events, Entity::Product, "sku-1"), Some(Operation::Create));
    assert_eq!(operation_of(&events, Entity::Assortment, "master"), Some(Operation::Create));
    assert_eq!(operation_of(&events, Entity::Assortment, "shoes"), Some(Operation::Create));
    assert_eq!(
        operation_of(&events, Entity::Assortment, "channel.ecommerce"),
        Some(Operation::Create)
    );

    // Categories with neither products nor children produce nothing
    assert_eq!(operation_of(&events, Entity::Assortment, "clearance"), None);
    assert_eq!(operation_of(&events, Entity::Assortment, "orphan"), None);
    let master = find(&events, Entity::Assortment, "master").unwrap();
    assert_eq!(linked(master, "children", "assortmentId"), vec!["shoes"]);

    // Products first, channels last
    assert_eq!(events.first().and_then(Event::payload_id), Some("sku-1"));
    assert_eq!(events.last().and_then(Event::payload_id), Some("channel.ecommerce"));

    assert_eq!(summary.submitted(), events.len());
    assert_eq!(harness.ledger_len().await, events.len());
}

#[tokio::test]
async fn test_second_run_updates_known_entities() {
    let harness = Harness::new().with_catalog();
    let first = harness.coordinator.run(false).await.unwrap();
    let first_count = first.submitted();
    let watermark = harness
        .coordinator
        .journal()
        .last_complete()
        .await
        .unwrap()
        .unwrap()
        .started_at;

    // A product created long ago that was never submitted is still new
    harness.source.set(
        Resource::Products,
        vec![
            product("sku-1", "2020-01-01T00:00:00+00:00", &["shoes"]),
            product("sku-2", "2019-06-01T00:00:00+00:00", &["shoes"]),
        ],
    );

    let second = harness.coordinator.run(false).await.unwrap();
    assert_eq!(second.since, watermark);

    let events = harness.target.last_batch();
    assert_eq!(operation_of(&events, Entity::Product, "sku-1"), Some(Operation::Update));
    assert_eq!(operation_of(&events, Entity::Product, "sku-2"), Some(Operation::Create));
    assert_eq!(operation_of(&events, Entity::Assortment, "shoes"), Some(Operation::Update));
    assert_eq!(
        operation_of(&events, Entity::Assortment, "channel.ecommerce"),
        Some(Operation::Update)
    );

    assert_eq!(harness.ledger_len().await, first_count + events.len());
}

#[tokio::test]
async fn test_product_created_after_watermark_is_created_again() {
    let harness = Harness::new().with_catalog();
    harness.coordinator.run(false).await.unwrap();

    // Recreated in the PIM after the last complete run
    harness.source.set(
        Resource::Products,
        vec![product("sku-1", "2999-01-01T00:00:00+00:00", &["shoes"])],
    );
    harness.coordinator.run(false).await.unwrap();

    let events = harness.target.last_batch();
    assert_eq!(operation_of(&events, Entity::Product, "sku-1"), Some(Operation::Create));
}

#[tokio::test]
async fn test_extraction_replaces_staging() {
    let harness = Harness::new().with_catalog();
    harness.coordinator.run(false).await.unwrap();

    harness.source.set(
        Resource::Products,
        vec![
            product("sku-7", "2020-01-01T00:00:00+00:00", &[]),
            product("sku-8", "2020-01-01T00:00:00+00:00", &[]),
        ],
    );
    harness.coordinator.run(false).await.unwrap();

    let staged = harness.store.documents(&staging_collection("products")).await;
    let ids: Vec<_> = staged.iter().filter_map(|d| d["identifier"].as_str()).collect();
    assert_eq!(ids, vec!["sku-7", "sku-8"]);
}

#[tokio::test]
async fn test_failed_load_leaves_ledger_and_watermark() {
    let harness = Harness::new().with_catalog();
    harness.target.set_down(true);

    let err = harness.coordinator.run(false).await.unwrap_err();
    assert!(matches!(err, SyncError::Load(_)));
    assert_eq!(harness.ledger_len().await, 0);

    let history = harness.coordinator.journal().history(1).await.unwrap();
    assert_eq!(history[0].status, CompletionStatus::FailedLoad);
    assert!(harness.coordinator.journal().last_complete().await.unwrap().is_none());

    // The retry starts from the same watermark and creates everything
    harness.target.set_down(false);
    let summary = harness.coordinator.run(false).await.unwrap();
    assert_eq!(summary.since, DateTime::<Utc>::UNIX_EPOCH);
    let events = harness.target.last_batch();
    assert_eq!(operation_of(&events, Entity::Product, "sku-1"), Some(Operation::Create));
    assert_eq!(harness.target.batch_count(), 1);
}

#[tokio::test]
async fn test_failed_transform_keeps_watermark() {
    let harness = Harness::new().with_catalog();
    let first = harness.coordinator.run(false).await.unwrap();
    let watermark = harness
        .coordinator
        .journal()
        .last_complete()
        .await
        .unwrap()
        .unwrap()
        .started_at;

    harness.source.set(
        Resource::Products,
        vec![json!({"family": "footwear", "categories": [], "values": {}})],
    );
    let err = harness.coordinator.run(false).await.unwrap_err();
    assert!(matches!(err, SyncError::Transform(_)));

    let history = harness.coordinator.journal().history(1).await.unwrap();
    assert_eq!(history[0].status, CompletionStatus::FailedTransform);
    assert_eq!(history[0].since, watermark);
    assert_eq!(harness.target.batch_count(), 1);
    assert_eq!(harness.ledger_len().await, first.submitted());

    let last = harness.coordinator.journal().last_complete().await.unwrap().unwrap();
    assert_eq!(last.run_id, first.run_id);
}

#[tokio::test]
async fn test_reset_ignores_previous_runs() {
    let harness = Harness::new().with_catalog();
    harness.coordinator.run(false).await.unwrap();

    let summary = harness.coordinator.run(true).await.unwrap();
    assert_eq!(summary.since, DateTime::<Utc>::UNIX_EPOCH);

    // sku-1 is in the ledger but was created after the epoch watermark
    let events = harness.target.last_batch();
    assert_eq!(operation_of(&events, Entity::Product, "sku-1"), Some(Operation::Create));
}

#[tokio::test]
async fn test_transform_is_idempotent() {
    let harness = Harness::new().with_catalog();
    harness.coordinator.run(false).await.unwrap();

    let store: Arc<dyn StagingStore> = Arc::new(harness.store.clone());
    let entry = JournalEntry {
        run_id: RunId::generate(),
        since: Utc::now(),
        started_at: Utc::now(),
        status: CompletionStatus::Running,
    };
    let context = RunContext::new(
        store,
        Arc::clone(&harness.source) as Arc<dyn SourceApi>,
        Arc::clone(&harness.target) as Arc<dyn TargetApi>,
        entry,
        RunSettings::default(),
    );

    let first = transform(&context).await.unwrap();
    let log_before = harness.store.documents(&event_collection("taxonomy")).await;
    let second = transform(&context).await.unwrap();
    let log_after = harness.store.documents(&event_collection("taxonomy")).await;

    assert_eq!(first.total_events(), second.total_events());
    assert_eq!(log_before, log_after);
}

#[tokio::test]
async fn test_incremental_run_keeps_full_category_membership() {
    let harness = Harness::with_settings(RunSettings {
        incremental: true,
        ..RunSettings::default()
    })
    .with_catalog();
    harness.coordinator.run(false).await.unwrap();

    harness.source.set(
        Resource::Products,
        vec![
            product("sku-1", "2020-01-01T00:00:00+00:00", &["shoes"]),
            product("sku-2", "2999-01-01T00:00:00+00:00", &["shoes"]),
        ],
    );
    harness.coordinator.run(false).await.unwrap();

    let events = harness.target.last_batch();
    assert_eq!(operation_of(&events, Entity::Product, "sku-1"), None);
    assert_eq!(operation_of(&events, Entity::Product, "sku-2"), Some(Operation::Create));

    // Unchanged products stay linked to their categories
    let shoes = find(&events, Entity::Assortment, "shoes").unwrap();
    assert_eq!(linked(shoes, "products", "productId"), vec!["sku-1", "sku-2"]);
    assert_eq!(harness.store.count(&staging_collection("products")).await, 2);
}
