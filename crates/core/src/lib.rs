//! Domain types and pure translation logic for store webhooks.
//!
//! Everything in this crate is synchronous and side-effect free:
//!
//! - [`entity`]: raw lifecycle events as raised by the commerce system.
//! - [`dto`]: hydrated transfer representations sent to subscribers.
//! - [`event_names`]: the closed set of webhook event names.
//! - [`classify`]: lifecycle event to notification plan and event name.
//! - [`scope`]: store scope of a hydrated entity.
//! - [`subscriber`]: store-suffix decoding and recipient filters.
//! - [`signing`]: HMAC signatures for outbound payloads.

pub mod classify;
pub mod dto;
pub mod entity;
pub mod error;
pub mod event_names;
pub mod scope;
pub mod signing;
pub mod subscriber;
pub mod types;
