//! Raw lifecycle events raised by the commerce system.
//!
//! A [`LifecycleEvent`] pairs a [`ChangeKind`] with the raw snapshot of the
//! entity that changed. Snapshots carry only what classification needs; the
//! full representation is hydrated separately (see [`crate::dto`]).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, StoreId, Timestamp};

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Entity kinds that raise lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Customer,
    Product,
    Category,
    Order,
    Store,
    StoreMapping,
    GenericAttribute,
}

impl EntityType {
    /// Return the entity name as used by the commerce system.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Product => "Product",
            Self::Category => "Category",
            Self::Order => "Order",
            Self::Store => "Store",
            Self::StoreMapping => "StoreMapping",
            Self::GenericAttribute => "GenericAttribute",
        }
    }

    /// Parse an entity name. Matching is exact and case-sensitive.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "Customer" => Ok(Self::Customer),
            "Product" => Ok(Self::Product),
            "Category" => Ok(Self::Category),
            "Order" => Ok(Self::Order),
            "Store" => Ok(Self::Store),
            "StoreMapping" => Ok(Self::StoreMapping),
            "GenericAttribute" => Ok(Self::GenericAttribute),
            _ => Err(CoreError::Validation(format!("Unknown entity type: '{s}'"))),
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ChangeKind
// ---------------------------------------------------------------------------

/// What happened to the entity row.
///
/// Customers, products, categories and orders are never physically deleted;
/// their deletion arrives as an `Updated` event with the soft-delete flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RawEntity
// ---------------------------------------------------------------------------

/// Raw snapshot of a changed entity, as handed over by the event source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity_type")]
pub enum RawEntity {
    Customer {
        id: DbId,
        /// Guest accounts are created for anonymous checkouts.
        #[serde(default)]
        is_guest: bool,
    },
    Product {
        id: DbId,
    },
    Category {
        id: DbId,
    },
    Order {
        id: DbId,
    },
    Store {
        id: StoreId,
    },
    /// Association of some owning entity with a store.
    StoreMapping {
        id: DbId,
        entity_id: DbId,
        /// Owning entity name, e.g. `"Product"`.
        entity_name: String,
        store_id: StoreId,
    },
    /// Detached key/value attribute of some owning entity.
    GenericAttribute {
        id: DbId,
        entity_id: DbId,
        key_group: String,
        key: String,
        value: String,
    },
}

impl RawEntity {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Customer { .. } => EntityType::Customer,
            Self::Product { .. } => EntityType::Product,
            Self::Category { .. } => EntityType::Category,
            Self::Order { .. } => EntityType::Order,
            Self::Store { .. } => EntityType::Store,
            Self::StoreMapping { .. } => EntityType::StoreMapping,
            Self::GenericAttribute { .. } => EntityType::GenericAttribute,
        }
    }

    pub fn id(&self) -> DbId {
        match self {
            Self::Customer { id, .. }
            | Self::Product { id }
            | Self::Category { id }
            | Self::Order { id }
            | Self::Store { id }
            | Self::StoreMapping { id, .. }
            | Self::GenericAttribute { id, .. } => *id,
        }
    }
}

// ---------------------------------------------------------------------------
// LifecycleEvent
// ---------------------------------------------------------------------------

/// A single insert/update/delete notification from the event source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub change: ChangeKind,
    pub entity: RawEntity,
    #[serde(default = "chrono::Utc::now")]
    pub occurred_at: Timestamp,
}

impl LifecycleEvent {
    pub fn new(change: ChangeKind, entity: RawEntity) -> Self {
        Self {
            change,
            entity,
            occurred_at: chrono::Utc::now(),
        }
    }

    pub fn inserted(entity: RawEntity) -> Self {
        Self::new(ChangeKind::Inserted, entity)
    }

    pub fn updated(entity: RawEntity) -> Self {
        Self::new(ChangeKind::Updated, entity)
    }

    pub fn deleted(entity: RawEntity) -> Self {
        Self::new(ChangeKind::Deleted, entity)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
