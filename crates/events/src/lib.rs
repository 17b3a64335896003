//! Webhook fan-out for commerce lifecycle events.
//!
//! - [`EventBus`]: in-process lifecycle event source backed by
//!   `tokio::sync::broadcast`.
//! - [`WebhookEventConsumer`]: classifies, hydrates and dispatches each event.
//! - [`Dispatcher`]: store-scoped recipient selection, including the
//!   `*Unmapped` complement for multi-store entities.
//! - [`WebhookManager`]: registry-backed [`Notifier`] delivering in the
//!   background through [`delivery`].
//! - [`InMemoryCatalog`]: [`DtoSource`] for the relay and tests.

pub mod bus;
pub mod catalog;
pub mod consumer;
pub mod delivery;
pub mod dispatcher;
pub mod hydration;
pub mod manager;
pub mod notifier;
pub mod registry;

pub use bus::EventBus;
pub use catalog::InMemoryCatalog;
pub use consumer::{HandleOutcome, WebhookEventConsumer};
pub use delivery::webhook::{WebhookDelivery, WebhookError};
pub use dispatcher::Dispatcher;
pub use hydration::DtoSource;
pub use manager::WebhookManager;
pub use notifier::{NotificationPayload, Notifier};
pub use registry::{SubscriberRegistry, WebhookSubscription};
