//! Webhook event names.
//!
//! The wire names must match the filters subscribers register with, so they
//! are kept verbatim in PascalCase.

use serde::{Deserialize, Serialize};

use crate::entity::EntityType;
use crate::error::CoreError;

/// Wildcard filter accepted by subscription registrations.
pub const WILDCARD_FILTER: &str = "*";

/// A webhook event name delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEvent {
    CustomerCreated,
    CustomerUpdated,
    CustomerDeleted,
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    ProductUnmapped,
    CategoryCreated,
    CategoryUpdated,
    CategoryDeleted,
    CategoryUnmapped,
    OrderCreated,
    OrderUpdated,
    OrderDeleted,
    StoreUpdated,
}

impl WebhookEvent {
    pub const ALL: [WebhookEvent; 15] = [
        Self::CustomerCreated,
        Self::CustomerUpdated,
        Self::CustomerDeleted,
        Self::ProductCreated,
        Self::ProductUpdated,
        Self::ProductDeleted,
        Self::ProductUnmapped,
        Self::CategoryCreated,
        Self::CategoryUpdated,
        Self::CategoryDeleted,
        Self::CategoryUnmapped,
        Self::OrderCreated,
        Self::OrderUpdated,
        Self::OrderDeleted,
        Self::StoreUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerCreated => "CustomerCreated",
            Self::CustomerUpdated => "CustomerUpdated",
            Self::CustomerDeleted => "CustomerDeleted",
            Self::ProductCreated => "ProductCreated",
            Self::ProductUpdated => "ProductUpdated",
            Self::ProductDeleted => "ProductDeleted",
            Self::ProductUnmapped => "ProductUnmapped",
            Self::CategoryCreated => "CategoryCreated",
            Self::CategoryUpdated => "CategoryUpdated",
            Self::CategoryDeleted => "CategoryDeleted",
            Self::CategoryUnmapped => "CategoryUnmapped",
            Self::OrderCreated => "OrderCreated",
            Self::OrderUpdated => "OrderUpdated",
            Self::OrderDeleted => "OrderDeleted",
            Self::StoreUpdated => "StoreUpdated",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown webhook event: '{s}'")))
    }

    /// `<Type>Created` for entity types that announce creation.
    pub fn created(entity_type: EntityType) -> Option<Self> {
        match entity_type {
            EntityType::Customer => Some(Self::CustomerCreated),
            EntityType::Product => Some(Self::ProductCreated),
            EntityType::Category => Some(Self::CategoryCreated),
            EntityType::Order => Some(Self::OrderCreated),
            _ => None,
        }
    }

    /// `<Type>Updated` for entity types that announce updates.
    pub fn updated(entity_type: EntityType) -> Option<Self> {
        match entity_type {
            EntityType::Customer => Some(Self::CustomerUpdated),
            EntityType::Product => Some(Self::ProductUpdated),
            EntityType::Category => Some(Self::CategoryUpdated),
            EntityType::Order => Some(Self::OrderUpdated),
            EntityType::Store => Some(Self::StoreUpdated),
            _ => None,
        }
    }

    /// `<Type>Deleted` for soft-deletable entity types.
    pub fn deleted(entity_type: EntityType) -> Option<Self> {
        match entity_type {
            EntityType::Customer => Some(Self::CustomerDeleted),
            EntityType::Product => Some(Self::ProductDeleted),
            EntityType::Category => Some(Self::CategoryDeleted),
            EntityType::Order => Some(Self::OrderDeleted),
            _ => None,
        }
    }

    /// `<Type>Unmapped` for entity types with multi-store mappings.
    pub fn unmapped(entity_type: EntityType) -> Option<Self> {
        match entity_type {
            EntityType::Product => Some(Self::ProductUnmapped),
            EntityType::Category => Some(Self::CategoryUnmapped),
            _ => None,
        }
    }

    /// Whether a subscription filter selects this event.
    pub fn matches_filter(&self, filter: &str) -> bool {
        filter == WILDCARD_FILTER || filter == self.as_str()
    }
}

impl std::fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
