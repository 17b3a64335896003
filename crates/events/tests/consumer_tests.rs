//! Integration tests for lifecycle event → webhook fan-out.
//!
//! A recording [`Notifier`] resolves recipients against a real
//! [`SubscriberRegistry`] with the filter the dispatcher chose, so the tests
//! observe exactly who would have been notified.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use storehooks_core::classify::SuppressReason;
use storehooks_core::dto::{CategoryDto, CustomerDto, EntityDto, OrderDto, ProductDto, StoreDto};
use storehooks_core::entity::{ChangeKind, EntityType, LifecycleEvent, RawEntity};
use storehooks_core::error::CoreError;
use storehooks_core::event_names::WebhookEvent;
use storehooks_core::scope::StoreScope;
use storehooks_core::subscriber::{decode_store_suffix, RecipientFilter};
use storehooks_core::types::DbId;
use storehooks_events::{
    Dispatcher, DtoSource, EventBus, HandleOutcome, InMemoryCatalog, NotificationPayload,
    Notifier, SubscriberRegistry, WebhookEventConsumer,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Sent {
    event: WebhookEvent,
    item: EntityDto,
    users: BTreeSet<String>,
}

struct RecordingNotifier {
    registry: SubscriberRegistry,
    sent: Mutex<Vec<Sent>>,
}

impl RecordingNotifier {
    fn new() -> Self {
        let json = r#"[
            {"id": "1", "user": "crm-5",     "url": "https://a.example.com/h", "filters": ["*"]},
            {"id": "2", "user": "crm-15",    "url": "https://b.example.com/h", "filters": ["*"]},
            {"id": "3", "user": "erp-3",     "url": "https://c.example.com/h", "filters": ["*"]},
            {"id": "4", "user": "erp-7",     "url": "https://d.example.com/h", "filters": ["*"]},
            {"id": "5", "user": "analytics", "url": "https://e.example.com/h", "filters": ["*"]},
            {"id": "6", "user": "shop-x",    "url": "https://f.example.com/h", "filters": ["*"]},
            {"id": "7", "user": "signup-5",  "url": "https://g.example.com/h",
             "filters": ["CustomerCreated"]}
        ]"#;
        Self {
            registry: SubscriberRegistry::from_json(json).unwrap(),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn all_users(&self, event: WebhookEvent) -> BTreeSet<String> {
        self.registry
            .subscribers_for(event)
            .unwrap()
            .into_iter()
            .map(|s| s.user)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_all(&self, event: WebhookEvent, payload: NotificationPayload, filter: RecipientFilter) {
        let users = self
            .registry
            .subscribers_for(event)
            .unwrap()
            .into_iter()
            .filter(|s| filter.admits(&s.user))
            .map(|s| s.user)
            .collect();
        self.sent.lock().unwrap().push(Sent {
            event,
            item: payload.item,
            users,
        });
    }
}

type Consumer = WebhookEventConsumer<Arc<InMemoryCatalog>, Arc<RecordingNotifier>>;

fn setup() -> (Consumer, Arc<InMemoryCatalog>, Arc<RecordingNotifier>) {
    let catalog = Arc::new(InMemoryCatalog::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let consumer = WebhookEventConsumer::new(
        Arc::clone(&catalog),
        Dispatcher::new(Arc::clone(&notifier)),
    );
    (consumer, catalog, notifier)
}

fn users(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|u| u.to_string()).collect()
}

fn customer(id: DbId, store: Option<DbId>, deleted: bool) -> CustomerDto {
    CustomerDto {
        id,
        email: Some(format!("c{id}@example.com")),
        first_name: Some("Jane".into()),
        last_name: None,
        language_id: None,
        active: true,
        deleted,
        registered_in_store_id: store,
    }
}

fn product(id: DbId, store_ids: Vec<DbId>, deleted: bool) -> ProductDto {
    ProductDto {
        id,
        name: format!("Product {id}"),
        sku: None,
        published: true,
        deleted,
        store_ids,
    }
}

fn category(id: DbId, store_ids: Vec<DbId>) -> CategoryDto {
    CategoryDto {
        id,
        name: format!("Category {id}"),
        parent_category_id: None,
        published: true,
        deleted: false,
        store_ids,
    }
}

fn mapping(entity_name: &str, entity_id: DbId) -> RawEntity {
    RawEntity::StoreMapping {
        id: 900,
        entity_id,
        entity_name: entity_name.into(),
        store_id: 3,
    }
}

fn attribute(entity_id: DbId, key: &str) -> RawEntity {
    RawEntity::GenericAttribute {
        id: 500,
        entity_id,
        key_group: "Customer".into(),
        key: key.into(),
        value: "x".into(),
    }
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn customer_insert_goes_to_its_store_only() {
    let (consumer, catalog, notifier) = setup();
    catalog.upsert(customer(9, Some(5), false).into()).unwrap();

    let outcome = consumer
        .handle(&LifecycleEvent::inserted(RawEntity::Customer {
            id: 9,
            is_guest: false,
        }))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        HandleOutcome::Dispatched {
            event: WebhookEvent::CustomerCreated,
            scope: StoreScope::single(5),
        }
    );
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].event, WebhookEvent::CustomerCreated);
    // "crm-15" ends in 5 but not in "-5".
    assert_eq!(sent[0].users, users(&["crm-5", "signup-5"]));
}

#[tokio::test]
async fn guest_customer_events_notify_nobody() {
    let (consumer, catalog, notifier) = setup();
    catalog.upsert(customer(1, Some(5), false).into()).unwrap();
    let guest = RawEntity::Customer {
        id: 1,
        is_guest: true,
    };

    for event in [
        LifecycleEvent::inserted(guest.clone()),
        LifecycleEvent::updated(guest),
    ] {
        let outcome = consumer.handle(&event).await.unwrap();
        assert_eq!(
            outcome,
            HandleOutcome::Suppressed(SuppressReason::GuestCustomer)
        );
    }
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn soft_deleted_customer_update_is_a_delete() {
    let (consumer, catalog, notifier) = setup();
    catalog.upsert(customer(9, Some(5), true).into()).unwrap();

    consumer
        .handle(&LifecycleEvent::updated(RawEntity::Customer {
            id: 9,
            is_guest: false,
        }))
        .await
        .unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].event, WebhookEvent::CustomerDeleted);
    assert_eq!(sent[0].users, users(&["crm-5"]));
}

#[tokio::test]
async fn customer_attribute_change_is_an_update() {
    let (consumer, catalog, notifier) = setup();
    catalog.upsert(customer(9, Some(5), false).into()).unwrap();

    let outcome = consumer
        .handle(&LifecycleEvent::inserted(attribute(9, "FirstName")))
        .await
        .unwrap();

    assert_matches!(
        outcome,
        HandleOutcome::Dispatched { event: WebhookEvent::CustomerUpdated, .. }
    );
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].item.id(), 9);
    assert_eq!(sent[0].users, users(&["crm-5"]));
}

#[tokio::test]
async fn customer_attribute_without_store_is_broadcast() {
    let (consumer, catalog, notifier) = setup();
    catalog.upsert(customer(9, None, false).into()).unwrap();

    consumer
        .handle(&LifecycleEvent::updated(attribute(9, "LanguageId")))
        .await
        .unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].event, WebhookEvent::CustomerUpdated);
    assert_eq!(sent[0].users, notifier.all_users(WebhookEvent::CustomerUpdated));
}

#[tokio::test]
async fn irrelevant_attribute_is_ignored() {
    let (consumer, catalog, notifier) = setup();
    catalog.upsert(customer(9, Some(5), false).into()).unwrap();

    let outcome = consumer
        .handle(&LifecycleEvent::inserted(attribute(9, "Phone")))
        .await
        .unwrap();

    assert_eq!(outcome, HandleOutcome::Ignored);
    assert!(notifier.sent().is_empty());
}

// ---------------------------------------------------------------------------
// Products and categories
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deleted_product_notifies_stores_and_unmapped_complement() {
    let (consumer, catalog, notifier) = setup();
    catalog.upsert(product(1, vec![3, 7], true).into()).unwrap();

    consumer
        .handle(&LifecycleEvent::updated(RawEntity::Product { id: 1 }))
        .await
        .unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);

    let primary = &sent[0];
    assert_eq!(primary.event, WebhookEvent::ProductDeleted);
    assert_eq!(primary.users, users(&["erp-3", "erp-7"]));

    let unmapped = &sent[1];
    assert_eq!(unmapped.event, WebhookEvent::ProductUnmapped);
    assert_eq!(
        unmapped.users,
        users(&["crm-5", "crm-15", "analytics", "shop-x"])
    );
    assert!(primary.users.is_disjoint(&unmapped.users));

    let scope: StoreScope = [3, 7].into_iter().collect();
    for user in &primary.users {
        assert!(decode_store_suffix(user).is_some_and(|id| scope.contains(id)));
    }
    for user in &unmapped.users {
        assert!(!decode_store_suffix(user).is_some_and(|id| scope.contains(id)));
    }
}

#[tokio::test]
async fn inserted_product_without_mappings_is_broadcast() {
    let (consumer, catalog, notifier) = setup();
    catalog.upsert(product(2, vec![], false).into()).unwrap();

    let outcome = consumer
        .handle(&LifecycleEvent::inserted(RawEntity::Product { id: 2 }))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        HandleOutcome::Dispatched {
            event: WebhookEvent::ProductCreated,
            scope: StoreScope::unscoped(),
        }
    );
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1, "no unmapped complement for unscoped entities");
    assert_eq!(sent[0].users, notifier.all_users(WebhookEvent::ProductCreated));
}

#[tokio::test]
async fn store_mapping_insert_re_announces_product_with_new_stores() {
    let (consumer, catalog, notifier) = setup();
    catalog.upsert(product(2, vec![3], false).into()).unwrap();

    consumer
        .handle(&LifecycleEvent::inserted(mapping("Product", 2)))
        .await
        .unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].event, WebhookEvent::ProductUpdated);
    assert_eq!(sent[0].users, users(&["erp-3"]));
    assert_eq!(sent[1].event, WebhookEvent::ProductUnmapped);
    assert!(!sent[1].users.contains("erp-3"));
}

#[tokio::test]
async fn store_mapping_delete_for_missing_category_is_dropped() {
    let (consumer, _catalog, notifier) = setup();

    let outcome = consumer
        .handle(&LifecycleEvent::deleted(mapping("Category", 42)))
        .await
        .unwrap();

    assert_eq!(outcome, HandleOutcome::OwnerMissing);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn store_mapping_for_category_uses_category_events() {
    let (consumer, catalog, notifier) = setup();
    catalog.upsert(category(42, vec![7]).into()).unwrap();

    consumer
        .handle(&LifecycleEvent::deleted(mapping("Category", 42)))
        .await
        .unwrap();

    let events: Vec<_> = notifier.sent().into_iter().map(|s| s.event).collect();
    assert_eq!(
        events,
        vec![WebhookEvent::CategoryUpdated, WebhookEvent::CategoryUnmapped]
    );
}

#[tokio::test]
async fn store_mapping_for_soft_deleted_category_announces_the_deletion() {
    let (consumer, catalog, notifier) = setup();
    let mut deleted = category(42, vec![7]);
    deleted.deleted = true;
    catalog.upsert(deleted.into()).unwrap();

    let outcome = consumer
        .handle(&LifecycleEvent::inserted(mapping("Category", 42)))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        HandleOutcome::Dispatched {
            event: WebhookEvent::CategoryDeleted,
            scope: StoreScope::single(7),
        }
    );
    let sent = notifier.sent();
    let events: Vec<_> = sent.iter().map(|s| s.event).collect();
    assert_eq!(
        events,
        vec![WebhookEvent::CategoryDeleted, WebhookEvent::CategoryUnmapped]
    );
    assert_eq!(sent[0].users, users(&["erp-7"]));
    assert!(!sent[1].users.contains("erp-7"));
}

#[tokio::test]
async fn store_mapping_for_other_entities_is_ignored() {
    let (consumer, catalog, notifier) = setup();
    catalog.upsert(customer(42, Some(3), false).into()).unwrap();

    let outcome = consumer
        .handle(&LifecycleEvent::inserted(mapping("Customer", 42)))
        .await
        .unwrap();

    assert_eq!(outcome, HandleOutcome::Ignored);
    assert!(notifier.sent().is_empty());
}

// ---------------------------------------------------------------------------
// Orders and stores
// ---------------------------------------------------------------------------

#[tokio::test]
async fn order_update_is_scoped_without_unmapped_complement() {
    let (consumer, catalog, notifier) = setup();
    catalog
        .upsert(
            OrderDto {
                id: 77,
                customer_id: Some(9),
                order_status: Some("Processing".into()),
                deleted: false,
                store_id: Some(3),
            }
            .into(),
        )
        .unwrap();

    consumer
        .handle(&LifecycleEvent::updated(RawEntity::Order { id: 77 }))
        .await
        .unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].event, WebhookEvent::OrderUpdated);
    assert_eq!(sent[0].users, users(&["erp-3"]));
}

#[tokio::test]
async fn store_update_goes_to_that_store() {
    let (consumer, catalog, notifier) = setup();
    catalog
        .upsert(
            StoreDto {
                id: 7,
                name: "Outlet".into(),
                url: Some("https://outlet.example.com".into()),
            }
            .into(),
        )
        .unwrap();

    consumer
        .handle(&LifecycleEvent::updated(RawEntity::Store { id: 7 }))
        .await
        .unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].event, WebhookEvent::StoreUpdated);
    assert_eq!(sent[0].users, users(&["erp-7"]));
}

#[tokio::test]
async fn unsubscribed_changes_never_reach_the_source() {
    let notifier = Arc::new(RecordingNotifier::new());
    let inner = InMemoryCatalog::new();
    inner.upsert(product(1, vec![3], false).into()).unwrap();
    let consumer = WebhookEventConsumer::new(
        FlakySource {
            inner,
            failing_id: 1,
        },
        Dispatcher::new(Arc::clone(&notifier)),
    );

    for event in [
        LifecycleEvent::deleted(RawEntity::Product { id: 1 }),
        LifecycleEvent::inserted(RawEntity::Store { id: 1 }),
        LifecycleEvent::updated(mapping("Product", 1)),
    ] {
        let outcome = consumer.handle(&event).await.unwrap();
        assert_eq!(outcome, HandleOutcome::NotSubscribed, "{event:?}");
    }
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn missing_entity_is_skipped() {
    let (consumer, _catalog, notifier) = setup();

    let outcome = consumer
        .handle(&LifecycleEvent::updated(RawEntity::Order { id: 1 }))
        .await
        .unwrap();

    assert_eq!(outcome, HandleOutcome::EntityMissing);
    assert!(notifier.sent().is_empty());
}

// ---------------------------------------------------------------------------
// Consumer loop
// ---------------------------------------------------------------------------

/// Fails hydration for one id and delegates everything else.
struct FlakySource {
    inner: InMemoryCatalog,
    failing_id: DbId,
}

#[async_trait]
impl DtoSource for FlakySource {
    async fn hydrate(
        &self,
        entity_type: EntityType,
        id: DbId,
        include_deleted: bool,
    ) -> Result<Option<EntityDto>, CoreError> {
        if id == self.failing_id {
            return Err(CoreError::Internal("database unavailable".into()));
        }
        self.inner.hydrate(entity_type, id, include_deleted).await
    }

    async fn lookup_owning_entity(
        &self,
        entity_name: &str,
        id: DbId,
    ) -> Result<Option<RawEntity>, CoreError> {
        self.inner.lookup_owning_entity(entity_name, id).await
    }
}

#[tokio::test]
async fn run_loop_survives_hydration_errors_and_stops_when_bus_closes() {
    let inner = InMemoryCatalog::new();
    inner.upsert(product(1, vec![3], false).into()).unwrap();
    inner.upsert(product(2, vec![], false).into()).unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let consumer = WebhookEventConsumer::new(
        FlakySource {
            inner,
            failing_id: 13,
        },
        Dispatcher::new(Arc::clone(&notifier)),
    );

    let bus = EventBus::default();
    let receiver = bus.subscribe();
    let task = tokio::spawn(consumer.run(receiver));

    bus.publish(LifecycleEvent::updated(RawEntity::Product { id: 13 }));
    bus.publish(LifecycleEvent::updated(RawEntity::Product { id: 1 }));
    bus.publish(LifecycleEvent::new(
        ChangeKind::Inserted,
        RawEntity::Product { id: 2 },
    ));
    drop(bus);

    task.await.expect("consumer loop should exit cleanly");

    let events: Vec<_> = notifier.sent().into_iter().map(|s| s.event).collect();
    assert_eq!(
        events,
        vec![
            WebhookEvent::ProductUpdated,
            WebhookEvent::ProductUnmapped,
            WebhookEvent::ProductCreated,
        ]
    );
}

#[tokio::test]
async fn hydrating_the_wrong_entity_type_is_an_error() {
    struct WrongTypeSource;

    #[async_trait]
    impl DtoSource for WrongTypeSource {
        async fn hydrate(
            &self,
            _entity_type: EntityType,
            id: DbId,
            _include_deleted: bool,
        ) -> Result<Option<EntityDto>, CoreError> {
            Ok(Some(category(id, vec![]).into()))
        }

        async fn lookup_owning_entity(
            &self,
            _entity_name: &str,
            _id: DbId,
        ) -> Result<Option<RawEntity>, CoreError> {
            Ok(None)
        }
    }

    let notifier = Arc::new(RecordingNotifier::new());
    let consumer = WebhookEventConsumer::new(WrongTypeSource, Dispatcher::new(Arc::clone(&notifier)));

    let result = consumer
        .handle(&LifecycleEvent::updated(RawEntity::Product { id: 1 }))
        .await;
    assert_matches!(result, Err(CoreError::Internal(_)));
    assert!(notifier.sent().is_empty());
}
