//! Store scope of a hydrated entity.
//!
//! An empty scope means the entity is not (yet) tied to any store and every
//! subscriber is eligible. Newly inserted products and categories land here
//! because their store mappings are written after the insert event fires; the
//! resulting broadcast is accepted.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::dto::EntityDto;
use crate::types::StoreId;

/// Set of store ids a notification is addressed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreScope(BTreeSet<StoreId>);

impl StoreScope {
    /// The unscoped (global) scope.
    pub fn unscoped() -> Self {
        Self::default()
    }

    pub fn single(store_id: StoreId) -> Self {
        Self(BTreeSet::from([store_id]))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, store_id: StoreId) -> bool {
        self.0.contains(&store_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = StoreId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<StoreId> for StoreScope {
    fn from_iter<I: IntoIterator<Item = StoreId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Option<StoreId>> for StoreScope {
    fn from(store_id: Option<StoreId>) -> Self {
        store_id.into_iter().collect()
    }
}

/// Compute the stores the entity is currently associated with.
pub fn resolve_scope(dto: &EntityDto) -> StoreScope {
    match dto {
        EntityDto::Customer(c) => c.registered_in_store_id.into(),
        EntityDto::Order(o) => o.store_id.into(),
        EntityDto::Store(s) => StoreScope::single(s.id),
        EntityDto::Product(p) => p.store_ids.iter().copied().collect(),
        EntityDto::Category(c) => c.store_ids.iter().copied().collect(),
    }
}
