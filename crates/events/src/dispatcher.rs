//! Store-scoped fan-out of classified webhook events.
//!
//! [`Dispatcher`] turns one classified event into one or two
//! [`Notifier::notify_all`] calls:
//!
//! - unscoped entities go to every subscriber of the event;
//! - scoped entities go to subscribers bound to one of their stores, and for
//!   products and categories an `*Unmapped` event goes to every other
//!   subscriber so it can drop the entity from its store.

use storehooks_core::dto::EntityDto;
use storehooks_core::event_names::WebhookEvent;
use storehooks_core::scope::StoreScope;
use storehooks_core::subscriber::RecipientFilter;

use crate::notifier::{NotificationPayload, Notifier};

pub struct Dispatcher<N> {
    notifier: N,
}

impl<N: Notifier> Dispatcher<N> {
    pub fn new(notifier: N) -> Self {
        Self { notifier }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Fan `event` for `item` out to the subscribers eligible under `scope`.
    pub fn dispatch(&self, event: WebhookEvent, item: &EntityDto, scope: &StoreScope) {
        if scope.is_empty() {
            tracing::debug!(event_type = %event, entity_id = item.id(), "Dispatching unscoped");
            self.notifier.notify_all(
                event,
                NotificationPayload::new(item.clone()),
                RecipientFilter::All,
            );
            return;
        }

        tracing::debug!(
            event_type = %event,
            entity_id = item.id(),
            stores = ?scope,
            "Dispatching to store subscribers"
        );
        self.notifier.notify_all(
            event,
            NotificationPayload::new(item.clone()),
            RecipientFilter::InScope(scope.clone()),
        );

        if !item.supports_unmapped() {
            return;
        }
        if let Some(unmapped) = WebhookEvent::unmapped(item.entity_type()) {
            self.notifier.notify_all(
                unmapped,
                NotificationPayload::new(item.clone()),
                RecipientFilter::OutOfScope(scope.clone()),
            );
        }
    }
}
