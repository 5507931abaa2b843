//! Minimal STOMP 1.2 support for text WebSockets.
//!
//! Frames are encoded to and decoded from UTF-8 text; both the broker and the
//! client session use the same codec and heart-beat negotiation.

mod codec;
mod error;
mod frame;
mod heartbeat;

pub use codec::{DEFAULT_MAX_FRAME_SIZE, FrameDecoder, Inbound};
pub use error::StompError;
pub use frame::{Command, Frame};
pub use heartbeat::{HEARTBEAT_EOL, HeartBeat, Negotiated};

/// Protocol versions offered in CONNECT
pub const ACCEPT_VERSION: &str = "1.2,1.1,1.0";

/// Protocol version spoken by the broker
pub const VERSION: &str = "1.2";
