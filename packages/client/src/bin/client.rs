//! Interactive STOMP chat client.
//!
//! Connects to the Hearth broker, joins the public room and both notification
//! channels, and sends what is typed at the prompt. Lost connections are
//! retried after a fixed delay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hearth-client -- --user-id alice
//! cargo run --bin hearth-client -- -u bob --url ws://127.0.0.1:8080/ws
//! ```

use std::time::Duration;

use clap::Parser;

use hearth_client::{
    SessionConfig,
    config::{DEFAULT_HEARTBEAT_MILLIS, DEFAULT_RECONNECT_DELAY_MILLIS, DEFAULT_URL},
    run_client,
};
use hearth_shared::{logger::setup_logger, stomp::HeartBeat};

#[derive(Parser, Debug)]
#[command(name = "hearth-client")]
#[command(about = "STOMP over WebSocket chat client", long_about = None)]
struct Args {
    /// User ID to chat as
    #[arg(short = 'u', long)]
    user_id: String,

    /// WebSocket URL of the broker's STOMP endpoint
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Delay before reconnecting after a lost connection (0 disables)
    #[arg(long, default_value_t = DEFAULT_RECONNECT_DELAY_MILLIS)]
    reconnect_delay_ms: u64,

    /// Heart-beat period offered in both directions (0 disables)
    #[arg(long, default_value_t = DEFAULT_HEARTBEAT_MILLIS)]
    heartbeat_ms: u64,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = SessionConfig::new(args.url)
        .with_heart_beat(HeartBeat::new(args.heartbeat_ms, args.heartbeat_ms))
        .with_reconnect_delay(Duration::from_millis(args.reconnect_delay_ms));

    if let Err(e) = run_client(config, args.user_id).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
