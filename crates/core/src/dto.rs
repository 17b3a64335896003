//! Hydrated transfer representations.
//!
//! These are the read models delivered to webhook subscribers. They are
//! produced by the hydration service with store associations resolved; this
//! crate only reads them.

use serde::{Deserialize, Serialize};

use crate::entity::EntityType;
use crate::types::{DbId, StoreId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDto {
    pub id: DbId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub language_id: Option<DbId>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub deleted: bool,
    /// Store the customer registered in, if known.
    #[serde(default)]
    pub registered_in_store_id: Option<StoreId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub deleted: bool,
    /// Stores the product is limited to. Empty until the mappings are saved.
    #[serde(default)]
    pub store_ids: Vec<StoreId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub parent_category_id: Option<DbId>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub store_ids: Vec<StoreId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDto {
    pub id: DbId,
    #[serde(default)]
    pub customer_id: Option<DbId>,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub store_id: Option<StoreId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDto {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// EntityDto
// ---------------------------------------------------------------------------

/// Closed set of hydrated entities that webhooks can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity_type")]
pub enum EntityDto {
    Customer(CustomerDto),
    Product(ProductDto),
    Category(CategoryDto),
    Order(OrderDto),
    Store(StoreDto),
}

impl EntityDto {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Customer(_) => EntityType::Customer,
            Self::Product(_) => EntityType::Product,
            Self::Category(_) => EntityType::Category,
            Self::Order(_) => EntityType::Order,
            Self::Store(_) => EntityType::Store,
        }
    }

    pub fn id(&self) -> DbId {
        match self {
            Self::Customer(c) => c.id,
            Self::Product(p) => p.id,
            Self::Category(c) => c.id,
            Self::Order(o) => o.id,
            Self::Store(s) => s.id,
        }
    }

    /// Soft-delete flag. Stores cannot be soft-deleted.
    pub fn is_deleted(&self) -> bool {
        match self {
            Self::Customer(c) => c.deleted,
            Self::Product(p) => p.deleted,
            Self::Category(c) => c.deleted,
            Self::Order(o) => o.deleted,
            Self::Store(_) => false,
        }
    }

    /// Whether removal from a store is announced with an `*Unmapped` event.
    pub fn supports_unmapped(&self) -> bool {
        matches!(self, Self::Product(_) | Self::Category(_))
    }
}

impl From<CustomerDto> for EntityDto {
    fn from(dto: CustomerDto) -> Self {
        Self::Customer(dto)
    }
}

impl From<ProductDto> for EntityDto {
    fn from(dto: ProductDto) -> Self {
        Self::Product(dto)
    }
}

impl From<CategoryDto> for EntityDto {
    fn from(dto: CategoryDto) -> Self {
        Self::Category(dto)
    }
}

impl From<OrderDto> for EntityDto {
    fn from(dto: OrderDto) -> Self {
        Self::Order(dto)
    }
}

impl From<StoreDto> for EntityDto {
    fn from(dto: StoreDto) -> Self {
        Self::Store(dto)
    }
}
