//! Delivery transport for webhook notifications.
//!
//! [`webhook::WebhookDelivery`] pushes signed JSON envelopes to subscriber
//! endpoints with retry; [`crate::manager::WebhookManager`] decides who gets
//! them.

pub mod webhook;
