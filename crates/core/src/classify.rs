//! Lifecycle event classification.
//!
//! Classification runs in two pure steps:
//!
//! 1. [`classify`] looks at the raw event only and decides whether it is
//!    suppressed, ignored, or which entity must be hydrated for it.
//! 2. [`resolve_event`] picks the webhook event name once the hydrated DTO
//!    (and with it the soft-delete flag) is known.

use crate::dto::EntityDto;
use crate::entity::{ChangeKind, EntityType, LifecycleEvent, RawEntity};
use crate::event_names::WebhookEvent;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Attribute key group for customer-owned generic attributes.
pub const CUSTOMER_KEY_GROUP: &str = "Customer";

pub const ATTRIBUTE_FIRST_NAME: &str = "FirstName";
pub const ATTRIBUTE_LAST_NAME: &str = "LastName";
pub const ATTRIBUTE_LANGUAGE_ID: &str = "LanguageId";

/// Customer fields persisted as generic attributes and exposed on the DTO.
pub const CUSTOMER_ATTRIBUTE_KEYS: [&str; 3] = [
    ATTRIBUTE_FIRST_NAME,
    ATTRIBUTE_LAST_NAME,
    ATTRIBUTE_LANGUAGE_ID,
];

/// Entity/change pairs the webhook consumer subscribes to.
pub const SUBSCRIBED_EVENTS: [(EntityType, ChangeKind); 13] = [
    (EntityType::Customer, ChangeKind::Inserted),
    (EntityType::Customer, ChangeKind::Updated),
    (EntityType::Product, ChangeKind::Inserted),
    (EntityType::Product, ChangeKind::Updated),
    (EntityType::Category, ChangeKind::Inserted),
    (EntityType::Category, ChangeKind::Updated),
    (EntityType::Order, ChangeKind::Inserted),
    (EntityType::Order, ChangeKind::Updated),
    (EntityType::Store, ChangeKind::Updated),
    (EntityType::StoreMapping, ChangeKind::Inserted),
    (EntityType::StoreMapping, ChangeKind::Deleted),
    (EntityType::GenericAttribute, ChangeKind::Inserted),
    (EntityType::GenericAttribute, ChangeKind::Updated),
];

/// Whether the consumer subscribes to this entity/change pair.
pub fn is_subscribed(entity_type: EntityType, change: ChangeKind) -> bool {
    SUBSCRIBED_EVENTS.contains(&(entity_type, change))
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Whether the event announces a new entity or a change to an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    GuestCustomer,
}

/// What to hydrate for a classified event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPlan {
    pub entity_type: EntityType,
    pub entity_id: DbId,
    pub intent: Intent,
    /// Hydrate soft-deleted rows too, so deletions can be announced.
    pub include_deleted: bool,
    /// The entity is the owner of a changed store mapping and must be looked
    /// up before hydrating; a missing owner drops the event.
    pub owner_lookup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The event must not produce any notification.
    Suppressed(SuppressReason),
    /// Not an event webhooks care about.
    Ignored,
    Notify(NotificationPlan),
}

impl Classification {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed(_))
    }

    pub fn plan(&self) -> Option<&NotificationPlan> {
        match self {
            Self::Notify(plan) => Some(plan),
            _ => None,
        }
    }
}

fn notify(
    entity_type: EntityType,
    entity_id: DbId,
    intent: Intent,
    include_deleted: bool,
) -> Classification {
    Classification::Notify(NotificationPlan {
        entity_type,
        entity_id,
        intent,
        include_deleted,
        owner_lookup: false,
    })
}

/// Classify a raw lifecycle event.
pub fn classify(event: &LifecycleEvent) -> Classification {
    use ChangeKind::{Deleted, Inserted, Updated};

    match (&event.entity, event.change) {
        (RawEntity::Customer { is_guest: true, .. }, Inserted | Updated) => {
            Classification::Suppressed(SuppressReason::GuestCustomer)
        }
        (RawEntity::Customer { id, .. }, Inserted) => {
            notify(EntityType::Customer, *id, Intent::Created, false)
        }
        (RawEntity::Customer { id, .. }, Updated) => {
            notify(EntityType::Customer, *id, Intent::Updated, true)
        }

        (RawEntity::Product { id }, Inserted) => {
            notify(EntityType::Product, *id, Intent::Created, true)
        }
        (RawEntity::Product { id }, Updated) => {
            notify(EntityType::Product, *id, Intent::Updated, true)
        }
        (RawEntity::Category { id }, Inserted) => {
            notify(EntityType::Category, *id, Intent::Created, true)
        }
        (RawEntity::Category { id }, Updated) => {
            notify(EntityType::Category, *id, Intent::Updated, true)
        }
        (RawEntity::Order { id }, Inserted) => notify(EntityType::Order, *id, Intent::Created, true),
        (RawEntity::Order { id }, Updated) => notify(EntityType::Order, *id, Intent::Updated, true),

        (RawEntity::Store { id }, Updated) => notify(EntityType::Store, *id, Intent::Updated, true),

        // Editing store mappings does not touch the owning entity, so the
        // owner is re-announced with its refreshed store list.
        (
            RawEntity::StoreMapping {
                entity_id,
                entity_name,
                ..
            },
            Inserted | Deleted,
        ) => match EntityType::from_str(entity_name) {
            Ok(owner @ (EntityType::Category | EntityType::Product)) => {
                Classification::Notify(NotificationPlan {
                    entity_type: owner,
                    entity_id: *entity_id,
                    intent: Intent::Updated,
                    include_deleted: true,
                    owner_lookup: true,
                })
            }
            _ => Classification::Ignored,
        },

        // Some customer fields live in generic attributes and never raise a
        // customer update of their own. The key group must be `Customer` too;
        // a same-named key of another entity is not a customer change.
        (
            RawEntity::GenericAttribute {
                entity_id,
                key_group,
                key,
                ..
            },
            Inserted | Updated,
        ) if key_group == CUSTOMER_KEY_GROUP && CUSTOMER_ATTRIBUTE_KEYS.contains(&key.as_str()) => {
            notify(EntityType::Customer, *entity_id, Intent::Updated, false)
        }

        _ => Classification::Ignored,
    }
}

/// Pick the webhook event for a plan once the entity has been hydrated.
///
/// A soft-deleted entity always yields the `*Deleted` event.
pub fn resolve_event(plan: &NotificationPlan, dto: &EntityDto) -> Option<WebhookEvent> {
    if dto.is_deleted() {
        return WebhookEvent::deleted(plan.entity_type);
    }
    match plan.intent {
        Intent::Created => WebhookEvent::created(plan.entity_type),
        Intent::Updated => WebhookEvent::updated(plan.entity_type),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
