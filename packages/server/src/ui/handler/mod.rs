mod http;
mod websocket;

pub use http::{broadcast_notification, health_check, send_notification};
pub use websocket::websocket_handler;
