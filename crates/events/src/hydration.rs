//! Seam to the data-access layer that assembles transfer representations.

use std::sync::Arc;

use async_trait::async_trait;
use storehooks_core::dto::EntityDto;
use storehooks_core::entity::{EntityType, RawEntity};
use storehooks_core::error::CoreError;
use storehooks_core::types::DbId;

/// Hydrates entity ids into [`EntityDto`]s with store associations resolved.
///
/// `Ok(None)` means the entity does not exist (or is soft-deleted and
/// `include_deleted` is false). Errors are reserved for genuine failures of
/// the underlying store.
#[async_trait]
pub trait DtoSource: Send + Sync {
    async fn hydrate(
        &self,
        entity_type: EntityType,
        id: DbId,
        include_deleted: bool,
    ) -> Result<Option<EntityDto>, CoreError>;

    /// Look up the raw owner of a store mapping by its entity name.
    async fn lookup_owning_entity(
        &self,
        entity_name: &str,
        id: DbId,
    ) -> Result<Option<RawEntity>, CoreError>;
}

#[async_trait]
impl<T: DtoSource + ?Sized> DtoSource for Arc<T> {
    async fn hydrate(
        &self,
        entity_type: EntityType,
        id: DbId,
        include_deleted: bool,
    ) -> Result<Option<EntityDto>, CoreError> {
        (**self).hydrate(entity_type, id, include_deleted).await
    }

    async fn lookup_owning_entity(
        &self,
        entity_name: &str,
        id: DbId,
    ) -> Result<Option<RawEntity>, CoreError> {
        (**self).lookup_owning_entity(entity_name, id).await
    }
}
