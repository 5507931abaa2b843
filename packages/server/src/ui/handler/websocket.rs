//! STOMP over WebSocket session handler.
//!
//! Each upgraded socket runs one STOMP session: CONNECT is answered with
//! CONNECTED, then SUBSCRIBE / UNSUBSCRIBE / SEND / DISCONNECT are dispatched
//! to the use cases. Outbound frames (replies, MESSAGEs from other sessions,
//! heart-beats) all go through one channel so they are written in order.
//! After an ERROR frame the session is closed.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use hearth_shared::stomp::{
    Command, Frame, FrameDecoder, HEARTBEAT_EOL, HeartBeat, Inbound, Negotiated, VERSION,
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, Interval, interval_at},
};

use crate::{
    config::SERVER_NAME,
    domain::{PusherChannel, SessionId, SessionIdFactory, Username},
    ui::state::AppState,
};

/// How long queued frames may take to flush once the session ends
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that writes queued text to the WebSocket, then closes it
/// once every sender of the channel is gone.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.close().await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = match SessionIdFactory::generate() {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to generate session id: {}", e);
            return;
        }
    };
    tracing::info!("WebSocket '{}' opened", session_id);

    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut send_task = pusher_loop(rx, sender);

    let mut session = StompSession::new(session_id.clone(), state.clone(), tx);
    let mut decoder = FrameDecoder::new();
    let mut heartbeat: Option<Interval> = None;
    let mut watchdog: Option<Interval> = None;
    let mut read_timeout: Option<Duration> = None;
    let mut last_inbound = Instant::now();

    'session: loop {
        tokio::select! {
            message = receiver.next() => {
                let chunk = match message {
                    Some(Ok(Message::Text(text))) => text.as_str().as_bytes().to_vec(),
                    Some(Ok(Message::Binary(data))) => data.to_vec(),
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("WebSocket '{}' closed by client", session_id);
                        break;
                    }
                    // Ping/pong is handled automatically by the WebSocket protocol
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket '{}' error: {}", session_id, e);
                        break;
                    }
                };
                last_inbound = Instant::now();

                let items = match decoder.feed(&chunk) {
                    Ok(items) => items,
                    Err(e) => {
                        session.fail("Malformed frame", e.to_string());
                        break;
                    }
                };
                for item in items {
                    let Inbound::Frame(frame) = item else {
                        continue;
                    };
                    match session.handle(frame).await {
                        Flow::Continue => {}
                        Flow::Connected(negotiated) => {
                            heartbeat = negotiated
                                .send_every
                                .map(|period| interval_at(Instant::now() + period, period));
                            watchdog = negotiated
                                .expect_every
                                .map(|period| interval_at(Instant::now() + period, period));
                            read_timeout = negotiated.read_timeout();
                        }
                        Flow::Close => break 'session,
                    }
                }
            }
            _ = tick(&mut heartbeat) => session.push_raw(HEARTBEAT_EOL),
            _ = tick(&mut watchdog) => {
                if let Some(timeout) = read_timeout
                    && last_inbound.elapsed() > timeout
                {
                    tracing::warn!(
                        "No heart-beat from '{}' for {} ms; closing",
                        session_id,
                        timeout.as_millis()
                    );
                    break;
                }
            }
            _ = &mut send_task => {
                tracing::info!("WebSocket '{}' writer stopped", session_id);
                break;
            }
        }
    }

    session.close().await;

    // Dropping the last sender lets the writer flush and close the socket.
    if !send_task.is_finished()
        && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut send_task)
            .await
            .is_err()
    {
        send_task.abort();
    }
    tracing::info!("WebSocket '{}' finished", session_id);
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// What the socket loop does after a frame
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    /// CONNECTED was sent; start heart-beating
    Connected(Negotiated),
    Close,
}

/// STOMP state of one socket
struct StompSession {
    id: SessionId,
    state: Arc<AppState>,
    /// Dropped on close so the writer can finish
    outbound: Option<PusherChannel>,
    connected: bool,
}

impl StompSession {
    fn new(id: SessionId, state: Arc<AppState>, outbound: PusherChannel) -> Self {
        Self {
            id,
            state,
            outbound: Some(outbound),
            connected: false,
        }
    }

    async fn handle(&mut self, frame: Frame) -> Flow {
        tracing::debug!("Session '{}' received {}", self.id, frame.command);

        if !self.connected {
            return match frame.command {
                Command::Connect | Command::Stomp => self.connect(&frame).await,
                other => self.fail("Expected CONNECT frame", format!("received {}", other)),
            };
        }

        let flow = match frame.command {
            Command::Connect | Command::Stomp => self.fail("Already connected", ""),
            Command::Subscribe => self.subscribe(&frame).await,
            Command::Unsubscribe => self.unsubscribe(&frame).await,
            Command::Send => self.send(&frame).await,
            Command::Disconnect => {
                tracing::info!("Session '{}' sent DISCONNECT", self.id);
                self.send_receipt(&frame);
                return Flow::Close;
            }
            Command::Ack | Command::Nack | Command::Begin | Command::Commit | Command::Abort => {
                tracing::debug!("Ignoring {} (auto-ack, no transactions)", frame.command);
                Flow::Continue
            }
            Command::Connected | Command::Message | Command::Receipt | Command::Error => self
                .fail(
                    "Unexpected frame",
                    format!("{} is sent by the broker only", frame.command),
                ),
        };

        if flow == Flow::Continue {
            self.send_receipt(&frame);
        }
        flow
    }

    async fn connect(&mut self, frame: &Frame) -> Flow {
        if let Some(versions) = frame.header("accept-version")
            && !versions.split(',').any(|v| v.trim() == VERSION)
        {
            return self.fail(
                "Unsupported protocol version",
                format!("Supported protocol versions are {}", VERSION),
            );
        }

        let client_heart_beat = match frame.heart_beat() {
            Ok(heart_beat) => heart_beat,
            Err(e) => return self.fail("Invalid heart-beat header", e.to_string()),
        };

        let login = frame
            .header("login")
            .and_then(|login| Username::new(login.to_string()).ok());
        let Some(outbound) = self.outbound.clone() else {
            return Flow::Close;
        };

        if let Err(e) = self
            .state
            .connect_session_usecase
            .execute(self.id.clone(), login, outbound)
            .await
        {
            return self.fail("Connection rejected", e.to_string());
        }
        self.connected = true;

        let offered: HeartBeat = self.state.heart_beat;
        self.reply(&Frame::connected(offered, SERVER_NAME));
        tracing::info!("Session '{}' connected", self.id);

        Flow::Connected(offered.negotiate(&client_heart_beat))
    }

    async fn subscribe(&mut self, frame: &Frame) -> Flow {
        let headers = frame
            .require_header("id")
            .and_then(|id| Ok((id, frame.require_header("destination")?)));
        let (id, destination) = match headers {
            Ok(headers) => headers,
            Err(e) => return self.fail("Invalid SUBSCRIBE frame", e.to_string()),
        };
        match self
            .state
            .subscribe_usecase
            .subscribe(&self.id, id, destination)
            .await
        {
            Ok(()) => Flow::Continue,
            Err(e) => self.fail("Subscription rejected", e.to_string()),
        }
    }

    async fn unsubscribe(&mut self, frame: &Frame) -> Flow {
        let id = match frame.require_header("id") {
            Ok(id) => id,
            Err(e) => return self.fail("Invalid UNSUBSCRIBE frame", e.to_string()),
        };
        match self.state.subscribe_usecase.unsubscribe(&self.id, id).await {
            Ok(_) => Flow::Continue,
            Err(e) => self.fail("Unsubscribe rejected", e.to_string()),
        }
    }

    async fn send(&mut self, frame: &Frame) -> Flow {
        let destination = match frame.require_header("destination") {
            Ok(destination) => destination,
            Err(e) => return self.fail("Invalid SEND frame", e.to_string()),
        };
        match self
            .state
            .route_message_usecase
            .execute(&self.id, destination, &frame.body)
            .await
        {
            Ok(delivered) => {
                tracing::debug!(
                    "SEND to {} from '{}' delivered to {} subscriptions",
                    destination,
                    self.id,
                    delivered
                );
                Flow::Continue
            }
            Err(e) => self.fail(&e.to_string(), frame.body.clone()),
        }
    }

    fn send_receipt(&self, frame: &Frame) {
        if let Some(receipt) = frame.header("receipt") {
            self.reply(&Frame::receipt(receipt));
        }
    }

    /// Send ERROR; the caller closes the session
    fn fail(&self, message: &str, detail: impl Into<String>) -> Flow {
        tracing::warn!("Session '{}' error: {}", self.id, message);
        self.reply(&Frame::error(message, detail));
        Flow::Close
    }

    fn reply(&self, frame: &Frame) {
        self.push_raw(&frame.encode());
    }

    fn push_raw(&self, text: &str) {
        if let Some(outbound) = &self.outbound
            && outbound.send(text.to_string()).is_err()
        {
            tracing::debug!("Session '{}' writer already stopped", self.id);
        }
    }

    /// Remove the session (sending LEAVE if it had joined) and release the
    /// outbound channel.
    async fn close(&mut self) {
        if self.connected {
            self.connected = false;
            if let Err(e) = self
                .state
                .disconnect_session_usecase
                .execute(&self.id)
                .await
            {
                tracing::warn!("Failed to disconnect session '{}': {}", self.id, e);
            }
        }
        self.outbound = None;
    }
}
