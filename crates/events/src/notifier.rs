//! Outbound seam to the subscriber registry and delivery transport.

use std::sync::Arc;

use serde::Serialize;
use storehooks_core::dto::EntityDto;
use storehooks_core::event_names::WebhookEvent;
use storehooks_core::subscriber::RecipientFilter;

/// Body handed to every recipient: `{"item": <entity>}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub item: EntityDto,
}

impl NotificationPayload {
    pub fn new(item: EntityDto) -> Self {
        Self { item }
    }
}

/// Hands a notification to every registered subscriber of `event` that the
/// filter admits.
///
/// Implementations must return without waiting for delivery and must not
/// surface delivery failures to the caller.
pub trait Notifier: Send + Sync {
    fn notify_all(&self, event: WebhookEvent, payload: NotificationPayload, filter: RecipientFilter);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify_all(&self, event: WebhookEvent, payload: NotificationPayload, filter: RecipientFilter) {
        (**self).notify_all(event, payload, filter)
    }
}
