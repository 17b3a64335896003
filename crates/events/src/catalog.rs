//! In-memory [`DtoSource`] keyed by entity type and id.
//!
//! Used by the relay binary, which is fed snapshots alongside events, and by
//! tests.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use storehooks_core::dto::EntityDto;
use storehooks_core::entity::{EntityType, RawEntity};
use storehooks_core::error::CoreError;
use storehooks_core::types::DbId;

use crate::hydration::DtoSource;

type Key = (EntityType, DbId);

#[derive(Default)]
pub struct InMemoryCatalog {
    entries: RwLock<HashMap<Key, EntityDto>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the snapshot of an entity.
    pub fn upsert(&self, dto: EntityDto) -> Result<(), CoreError> {
        self.write()?.insert((dto.entity_type(), dto.id()), dto);
        Ok(())
    }

    /// Physically remove an entity, returning its last snapshot.
    pub fn remove(&self, entity_type: EntityType, id: DbId) -> Result<Option<EntityDto>, CoreError> {
        Ok(self.write()?.remove(&(entity_type, id)))
    }

    pub fn len(&self) -> usize {
        self.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Key, EntityDto>>, CoreError> {
        self.entries
            .read()
            .map_err(|_| CoreError::Internal("catalog lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Key, EntityDto>>, CoreError> {
        self.entries
            .write()
            .map_err(|_| CoreError::Internal("catalog lock poisoned".into()))
    }
}

#[async_trait]
impl DtoSource for InMemoryCatalog {
    async fn hydrate(
        &self,
        entity_type: EntityType,
        id: DbId,
        include_deleted: bool,
    ) -> Result<Option<EntityDto>, CoreError> {
        let entries = self.read()?;
        Ok(entries
            .get(&(entity_type, id))
            .filter(|dto| include_deleted || !dto.is_deleted())
            .cloned())
    }

    async fn lookup_owning_entity(
        &self,
        entity_name: &str,
        id: DbId,
    ) -> Result<Option<RawEntity>, CoreError> {
        let Ok(entity_type) = EntityType::from_str(entity_name) else {
            return Ok(None);
        };
        let entries = self.read()?;
        Ok(entries.get(&(entity_type, id)).map(|dto| match dto {
            EntityDto::Customer(c) => RawEntity::Customer {
                id: c.id,
                is_guest: false,
            },
            EntityDto::Product(p) => RawEntity::Product { id: p.id },
            EntityDto::Category(c) => RawEntity::Category { id: c.id },
            EntityDto::Order(o) => RawEntity::Order { id: o.id },
            EntityDto::Store(s) => RawEntity::Store { id: s.id },
        }))
    }
}
