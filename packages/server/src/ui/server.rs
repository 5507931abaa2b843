//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, RouteMessageUseCase,
        SendNotificationUseCase, SubscribeUseCase,
    },
};

use super::{
    handler::{broadcast_notification, health_check, send_notification, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// STOMP over WebSocket chat broker
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     ServerConfig::default(),
///     connect_session_usecase,
///     subscribe_usecase,
///     route_message_usecase,
///     send_notification_usecase,
///     disconnect_session_usecase,
/// );
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `config` - Bind address and heart-beat settings
    /// * `connect_session_usecase` - UseCase for CONNECT
    /// * `subscribe_usecase` - UseCase for SUBSCRIBE / UNSUBSCRIBE
    /// * `route_message_usecase` - UseCase for SEND
    /// * `send_notification_usecase` - UseCase for the notification REST API
    /// * `disconnect_session_usecase` - UseCase for closing a session
    pub fn new(
        config: ServerConfig,
        connect_session_usecase: Arc<ConnectSessionUseCase>,
        subscribe_usecase: Arc<SubscribeUseCase>,
        route_message_usecase: Arc<RouteMessageUseCase>,
        send_notification_usecase: Arc<SendNotificationUseCase>,
        disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    ) -> Self {
        let state = Arc::new(AppState {
            heart_beat: config.heart_beat,
            connect_session_usecase,
            subscribe_usecase,
            route_message_usecase,
            send_notification_usecase,
            disconnect_session_usecase,
        });
        Self { config, state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            // STOMP エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/notifications/send", post(send_notification))
            .route("/api/notifications/broadcast", post(broadcast_notification))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to the configured address and run until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        tracing::info!(
            "STOMP broker listening on {} (heart-beat {})",
            listener.local_addr()?,
            self.config.heart_beat.to_header()
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
