//! STOMP over WebSocket message broker for the Hearth chat.
//!
//! Clients connect to `/ws`, subscribe to topics and per-user queues and send
//! to `/app/...` routes; notifications can also be pushed over a small REST
//! API.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
