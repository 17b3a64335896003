//! In-memory webhook subscription registry.
//!
//! Subscriptions select events by name (or `*`) and encode their store
//! affinity in the `user` string (see [`storehooks_core::subscriber`]).

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use storehooks_core::error::CoreError;
use storehooks_core::event_names::{WebhookEvent, WILDCARD_FILTER};
use storehooks_core::subscriber::decode_store_suffix;
use storehooks_core::types::StoreId;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WebhookSubscription {
    #[validate(length(min = 1, max = 100))]
    pub id: String,

    /// Owner of the subscription, suffixed with `-<storeId>` when the
    /// subscriber is bound to a store.
    #[validate(length(min = 1, max = 256))]
    pub user: String,

    #[validate(url)]
    pub url: String,

    /// Signing secret; unsigned deliveries when absent.
    #[serde(default)]
    pub secret: Option<String>,

    /// Event names, or `*` for all events.
    #[validate(length(min = 1))]
    pub filters: Vec<String>,

    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl WebhookSubscription {
    /// Check field constraints and that every filter names a known event.
    pub fn validate_registration(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(format!("subscription '{}': {e}", self.id)))?;

        for filter in &self.filters {
            if filter != WILDCARD_FILTER {
                WebhookEvent::from_str(filter)?;
            }
        }
        Ok(())
    }

    /// Whether the subscription is active and selects `event`.
    pub fn wants(&self, event: WebhookEvent) -> bool {
        self.active && self.filters.iter().any(|f| event.matches_filter(f))
    }

    pub fn store_id(&self) -> Option<StoreId> {
        decode_store_suffix(&self.user)
    }
}

// ---------------------------------------------------------------------------
// SubscriberRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscriptions: RwLock<Vec<WebhookSubscription>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a JSON array of subscriptions.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let subscriptions: Vec<WebhookSubscription> = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("invalid subscriptions file: {e}")))?;

        let registry = Self::new();
        for subscription in subscriptions {
            registry.register(subscription)?;
        }
        Ok(registry)
    }

    pub fn register(&self, subscription: WebhookSubscription) -> Result<(), CoreError> {
        subscription.validate_registration()?;

        let mut subscriptions = self.write()?;
        if subscriptions.iter().any(|s| s.id == subscription.id) {
            return Err(CoreError::Conflict(format!(
                "subscription '{}' is already registered",
                subscription.id
            )));
        }
        if subscription.store_id().is_none() {
            tracing::debug!(
                id = %subscription.id,
                user = %subscription.user,
                "Subscription has no store suffix and only receives unscoped events"
            );
        }
        subscriptions.push(subscription);
        Ok(())
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unregister(&self, id: &str) -> Result<bool, CoreError> {
        let mut subscriptions = self.write()?;
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        Ok(subscriptions.len() != before)
    }

    pub fn list(&self) -> Result<Vec<WebhookSubscription>, CoreError> {
        Ok(self.read()?.clone())
    }

    /// Active subscriptions selecting `event`.
    pub fn subscribers_for(&self, event: WebhookEvent) -> Result<Vec<WebhookSubscription>, CoreError> {
        Ok(self
            .read()?
            .iter()
            .filter(|s| s.wants(event))
            .cloned()
            .collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<WebhookSubscription>>, CoreError> {
        self.subscriptions
            .read()
            .map_err(|_| CoreError::Internal("subscription registry lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<WebhookSubscription>>, CoreError> {
        self.subscriptions
            .write()
            .map_err(|_| CoreError::Internal("subscription registry lock poisoned".into()))
    }
}
