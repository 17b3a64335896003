//! Lifecycle event consumer that turns entity changes into webhooks.
//!
//! [`WebhookEventConsumer`] only takes the entity/change pairs listed in
//! [`SUBSCRIBED_EVENTS`](storehooks_core::classify::SUBSCRIBED_EVENTS) and
//! runs each through classify → hydrate → resolve scope → dispatch. Events are handled one at a time; nothing is
//! shared between events, and a failure on one event never stops the loop.

use storehooks_core::classify::{
    classify, is_subscribed, resolve_event, Classification, SuppressReason,
};
use storehooks_core::entity::LifecycleEvent;
use storehooks_core::error::CoreError;
use storehooks_core::event_names::WebhookEvent;
use storehooks_core::scope::{resolve_scope, StoreScope};
use tokio::sync::broadcast;

use crate::dispatcher::Dispatcher;
use crate::hydration::DtoSource;
use crate::notifier::Notifier;

/// What happened to a single lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The entity/change pair is outside the consumer's subscriptions.
    NotSubscribed,
    Suppressed(SuppressReason),
    Ignored,
    /// The owner of a changed store mapping is gone (deleted concurrently).
    OwnerMissing,
    /// Hydration found no entity, e.g. a race with deletion.
    EntityMissing,
    Dispatched {
        event: WebhookEvent,
        scope: StoreScope,
    },
}

pub struct WebhookEventConsumer<S, N> {
    source: S,
    dispatcher: Dispatcher<N>,
}

impl<S: DtoSource, N: Notifier> WebhookEventConsumer<S, N> {
    pub fn new(source: S, dispatcher: Dispatcher<N>) -> Self {
        Self { source, dispatcher }
    }

    /// Run the consumer loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<LifecycleEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle(&event).await {
                        tracing::error!(
                            error = %e,
                            entity_type = %event.entity.entity_type(),
                            entity_id = event.entity.id(),
                            change = %event.change,
                            "Failed to handle lifecycle event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Webhook consumer lagged, events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, webhook consumer shutting down");
                    break;
                }
            }
        }
    }

    /// Handle a single lifecycle event.
    pub async fn handle(&self, event: &LifecycleEvent) -> Result<HandleOutcome, CoreError> {
        if !is_subscribed(event.entity.entity_type(), event.change) {
            return Ok(HandleOutcome::NotSubscribed);
        }

        let plan = match classify(event) {
            Classification::Suppressed(reason) => {
                tracing::debug!(
                    entity_id = event.entity.id(),
                    reason = ?reason,
                    "Lifecycle event suppressed"
                );
                return Ok(HandleOutcome::Suppressed(reason));
            }
            Classification::Ignored => return Ok(HandleOutcome::Ignored),
            Classification::Notify(plan) => plan,
        };

        if plan.owner_lookup {
            let owner = self
                .source
                .lookup_owning_entity(plan.entity_type.as_str(), plan.entity_id)
                .await?;
            if owner.is_none() {
                tracing::debug!(
                    entity_type = %plan.entity_type,
                    entity_id = plan.entity_id,
                    "Store mapping owner no longer exists, dropping event"
                );
                return Ok(HandleOutcome::OwnerMissing);
            }
        }

        let Some(dto) = self
            .source
            .hydrate(plan.entity_type, plan.entity_id, plan.include_deleted)
            .await?
        else {
            tracing::debug!(
                entity_type = %plan.entity_type,
                entity_id = plan.entity_id,
                "Entity not found during hydration, skipping notification"
            );
            return Ok(HandleOutcome::EntityMissing);
        };

        if dto.entity_type() != plan.entity_type {
            return Err(CoreError::Internal(format!(
                "hydrated {} for {} {}",
                dto.entity_type(),
                plan.entity_type,
                plan.entity_id
            )));
        }

        let Some(webhook_event) = resolve_event(&plan, &dto) else {
            return Ok(HandleOutcome::Ignored);
        };
        let scope = resolve_scope(&dto);
        self.dispatcher.dispatch(webhook_event, &dto, &scope);

        Ok(HandleOutcome::Dispatched {
            event: webhook_event,
            scope,
        })
    }
}
