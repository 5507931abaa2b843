//! Server configuration.

use hearth_shared::stomp::HeartBeat;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Heart-beat period offered to clients in both directions (milliseconds)
pub const DEFAULT_HEARTBEAT_MILLIS: u64 = 10_000;

/// Name reported in the CONNECTED frame's `server` header
pub const SERVER_NAME: &str = concat!("hearth/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Heart-beat the broker offers in CONNECTED
    pub heart_beat: HeartBeat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            heart_beat: HeartBeat::new(DEFAULT_HEARTBEAT_MILLIS, DEFAULT_HEARTBEAT_MILLIS),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
