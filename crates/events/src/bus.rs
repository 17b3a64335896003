//! In-process lifecycle event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] stands in for the commerce system's event publisher. It is
//! designed to be shared via `Arc<EventBus>` across the application.
//!
//! Publishing does not wait for the consumer, and a receiver that falls more
//! than the channel capacity behind loses the oldest events. Callers that
//! need each event handled before the next change lands should await
//! [`WebhookEventConsumer::handle`](crate::consumer::WebhookEventConsumer::handle)
//! directly.

use storehooks_core::entity::LifecycleEvent;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus for [`LifecycleEvent`]s.
///
/// # Usage
///
/// ```rust
/// use storehooks_core::entity::{LifecycleEvent, RawEntity};
/// use storehooks_events::bus::EventBus;
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(LifecycleEvent::updated(RawEntity::Store { id: 1 }));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed events are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of receivers the event reached; zero when nobody
    /// is listening.
    pub fn publish(&self, event: LifecycleEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
