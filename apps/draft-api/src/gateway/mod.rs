//! The event gateway: WebSocket transport, typed events, and inbound
//! dispatch into session operations.

pub mod events;
pub mod handler;
pub mod server;
