//! Shared building blocks for the Hearth chat application.
//!
//! - `dto`: JSON wire records exchanged over STOMP and REST
//! - `destination`: fixed STOMP destinations
//! - `stomp`: STOMP 1.2 frame codec and heart-beat negotiation
//! - `time` / `logger`: ambient utilities used by both binaries

pub mod destination;
pub mod dto;
pub mod logger;
pub mod stomp;
pub mod time;
