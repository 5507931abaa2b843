//! Hearth STOMP broker.
//!
//! Accepts STOMP 1.2 sessions on `/ws`, routes `/app` destinations to the
//! chat handlers and fans messages out to `/topic` and `/user` subscribers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hearth-server
//! cargo run --bin hearth-server -- --host 0.0.0.0 --port 3000 --heartbeat-ms 5000
//! ```

use std::{collections::HashMap, sync::Arc};

use clap::Parser;
use hearth_server::{
    config::{DEFAULT_HEARTBEAT_MILLIS, DEFAULT_HOST, DEFAULT_PORT, ServerConfig},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemorySessionRepository,
    },
    ui::Server,
    usecase::{
        ConnectSessionUseCase, DeliverMessageUseCase, DisconnectSessionUseCase,
        RouteMessageUseCase, SendNotificationUseCase, SubscribeUseCase,
    },
};
use hearth_shared::{logger::setup_logger, stomp::HeartBeat, time::SystemClock};
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "hearth-server")]
#[command(about = "STOMP over WebSocket chat broker", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Heart-beat period offered to clients in both directions (0 disables)
    #[arg(long, default_value_t = DEFAULT_HEARTBEAT_MILLIS)]
    heartbeat_ms: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        heart_beat: HeartBeat::new(args.heartbeat_ms, args.heartbeat_ms),
    };

    // 1. Create Repository (in-memory session registry)
    let repository = Arc::new(InMemorySessionRepository::new(Arc::new(Mutex::new(
        Vec::new(),
    ))));

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_clients));
    let clock = Arc::new(SystemClock);

    // 3. Create UseCases
    let deliver_message_usecase = Arc::new(DeliverMessageUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let send_notification_usecase = Arc::new(SendNotificationUseCase::new(
        deliver_message_usecase.clone(),
        clock.clone(),
    ));
    let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let subscribe_usecase = Arc::new(SubscribeUseCase::new(repository.clone()));
    let route_message_usecase = Arc::new(RouteMessageUseCase::new(
        repository.clone(),
        deliver_message_usecase.clone(),
        send_notification_usecase.clone(),
        clock.clone(),
    ));
    let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(
        repository,
        message_pusher,
        deliver_message_usecase,
        clock,
    ));

    // 4. Create and run the server
    let server = Server::new(
        config,
        connect_session_usecase,
        subscribe_usecase,
        route_message_usecase,
        send_notification_usecase,
        disconnect_session_usecase,
    );
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
