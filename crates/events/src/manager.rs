//! Registry-backed [`Notifier`] that pushes webhooks in the background.

use std::sync::Arc;

use storehooks_core::error::CoreError;
use storehooks_core::event_names::WebhookEvent;
use storehooks_core::subscriber::RecipientFilter;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;

use crate::delivery::webhook::WebhookDelivery;
use crate::notifier::{NotificationPayload, Notifier};
use crate::registry::{SubscriberRegistry, WebhookSubscription};

/// Resolves recipients from the [`SubscriberRegistry`] and spawns one
/// tracked delivery task per recipient.
///
/// `notify_all` never waits on the network; callers that need to drain
/// in-flight deliveries (e.g. on shutdown) close and await the
/// [`TaskTracker`] they passed in.
pub struct WebhookManager {
    registry: Arc<SubscriberRegistry>,
    delivery: Arc<WebhookDelivery>,
    tracker: TaskTracker,
    runtime: Handle,
}

impl WebhookManager {
    pub fn new(
        registry: Arc<SubscriberRegistry>,
        delivery: Arc<WebhookDelivery>,
        tracker: TaskTracker,
        runtime: Handle,
    ) -> Self {
        Self {
            registry,
            delivery,
            tracker,
            runtime,
        }
    }

    /// Registered subscribers of `event` admitted by `filter`.
    pub fn recipients(
        &self,
        event: WebhookEvent,
        filter: &RecipientFilter,
    ) -> Result<Vec<WebhookSubscription>, CoreError> {
        Ok(self
            .registry
            .subscribers_for(event)?
            .into_iter()
            .filter(|s| filter.admits(&s.user))
            .collect())
    }
}

impl Notifier for WebhookManager {
    fn notify_all(&self, event: WebhookEvent, payload: NotificationPayload, filter: RecipientFilter) {
        let recipients = match self.recipients(event, &filter) {
            Ok(recipients) => recipients,
            Err(e) => {
                tracing::error!(event_type = %event, error = %e, "Failed to resolve webhook recipients");
                return;
            }
        };

        if recipients.is_empty() {
            tracing::debug!(event_type = %event, "No webhook subscribers matched");
            return;
        }

        tracing::info!(
            event_type = %event,
            entity_id = payload.item.id(),
            recipients = recipients.len(),
            "Queueing webhook deliveries"
        );

        let payload = Arc::new(payload);
        for subscription in recipients {
            let delivery = Arc::clone(&self.delivery);
            let payload = Arc::clone(&payload);
            // Failures are logged by `deliver` and end with the task.
            self.tracker.spawn_on(
                async move {
                    let _ = delivery.deliver(&subscription, event, &payload).await;
                },
                &self.runtime,
            );
        }
    }
}
