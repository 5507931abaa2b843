//! Connection driver: the task that owns one transport at a time.
//!
//! It performs the STOMP handshake, registers the subscriptions, publishes
//! the JOIN announcement, pumps frames in both directions, keeps heart-beats
//! flowing and reconnects after the configured delay.

use std::{future::Future, sync::Arc};

use hearth_shared::{
    destination::APP_CHAT_ADD_USER,
    dto::{ChatMessage, Notification},
    stomp::{Command, Frame, FrameDecoder, HEARTBEAT_EOL, Inbound, Negotiated},
    time::Clock,
};
use tokio::{
    sync::{Mutex, broadcast, mpsc},
    time::{Instant, Interval, interval_at},
};

use crate::{
    config::SessionConfig,
    domain::UserId,
    transport::{Connector, InboundText, TransportLink},
};

use super::{SessionEvent, SessionState, channel::Channel};

/// Requests from the session handle to its driver
#[derive(Debug)]
pub(crate) enum SessionCommand {
    Publish(Frame),
    Disconnect,
}

/// Why a single connection ended
#[derive(Debug, PartialEq, Eq)]
enum Exit {
    /// Disconnect was requested (or the session handle was dropped)
    Requested,
    /// The transport or broker failed; a retry may follow
    Lost,
}

pub(crate) struct Driver {
    config: SessionConfig,
    connector: Arc<dyn Connector>,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
    user_id: UserId,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
}

impl Driver {
    pub(crate) fn new(
        config: SessionConfig,
        connector: Arc<dyn Connector>,
        clock: Arc<dyn Clock>,
        state: Arc<Mutex<SessionState>>,
        events: broadcast::Sender<SessionEvent>,
        user_id: UserId,
        commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) -> Self {
        Self {
            config,
            connector,
            clock,
            state,
            events,
            user_id,
            commands,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            match self.run_connection().await {
                Exit::Requested => break,
                Exit::Lost => {
                    self.set_connected(false).await;
                    let retry_in = self.config.retry_delay();
                    self.emit(SessionEvent::ConnectionLost { retry_in });

                    let Some(delay) = retry_in else {
                        tracing::info!("Reconnection disabled; giving up");
                        break;
                    };
                    tracing::info!("Reconnecting in {} ms", delay.as_millis());
                    let slept =
                        race_disconnect(&mut self.commands, tokio::time::sleep(delay)).await;
                    if slept.is_none() {
                        break;
                    }
                }
            }
        }

        self.set_connected(false).await;
        self.emit(SessionEvent::Disconnected);
        tracing::info!("Session for '{}' closed", self.user_id);
    }

    async fn run_connection(&mut self) -> Exit {
        let url = self.config.url.clone();
        tracing::info!("Connecting to {} as '{}'", url, self.user_id);

        let mut link = match race_disconnect(&mut self.commands, self.connector.connect(&url)).await {
            None => return Exit::Requested,
            Some(Ok(link)) => link,
            Some(Err(e)) => {
                self.report_error(e.to_string());
                return Exit::Lost;
            }
        };
        let mut decoder = FrameDecoder::new();

        let connect = Frame::connect(&self.config.stomp_host(), self.config.heart_beat);
        if !send(&link, &connect) {
            self.report_error("Connection closed before STOMP handshake".to_string());
            return Exit::Lost;
        }

        let handshake = await_connected(&mut link.incoming, &mut decoder);
        let (connected, backlog) = match race_disconnect(&mut self.commands, handshake).await {
            None => {
                tracing::info!("Handshake cancelled by disconnect");
                return Exit::Requested;
            }
            Some(Ok(result)) => result,
            Some(Err(reason)) => {
                self.report_error(reason);
                return Exit::Lost;
            }
        };

        let negotiated = match connected.heart_beat() {
            Ok(remote) => self.config.heart_beat.negotiate(&remote),
            Err(e) => {
                tracing::warn!("Ignoring broker heart-beat header: {}", e);
                Negotiated::default()
            }
        };
        tracing::info!(
            "STOMP session established (version {}, heart-beat {:?})",
            connected.header("version").unwrap_or("1.0"),
            negotiated
        );

        for channel in Channel::ALL {
            let subscribe = Frame::subscribe(channel.subscription_id(), channel.destination());
            if !send(&link, &subscribe) {
                self.report_error("Connection closed while subscribing".to_string());
                return Exit::Lost;
            }
        }

        let join = ChatMessage::join(self.user_id.as_str(), self.clock.now_millis());
        match serde_json::to_string(&join) {
            Ok(body) => {
                if !send(&link, &Frame::send(APP_CHAT_ADD_USER, body)) {
                    self.report_error("Connection closed while joining".to_string());
                    return Exit::Lost;
                }
            }
            Err(e) => tracing::error!("Failed to serialize JOIN message: {}", e),
        }

        {
            let mut state = self.state.lock().await;
            state.is_connected = true;
            state.messages.push(join);
        }
        self.emit(SessionEvent::Connected {
            user_id: self.user_id.to_string(),
        });

        for frame in backlog {
            if let Some(exit) = self.handle_frame(frame).await {
                return exit;
            }
        }

        self.pump(link, decoder, negotiated).await
    }

    async fn pump(
        &mut self,
        mut link: TransportLink,
        mut decoder: FrameDecoder,
        negotiated: Negotiated,
    ) -> Exit {
        let mut heartbeat = negotiated
            .send_every
            .map(|period| interval_at(Instant::now() + period, period));
        let mut watchdog = negotiated
            .expect_every
            .map(|period| interval_at(Instant::now() + period, period));
        let read_timeout = negotiated.read_timeout();
        let mut last_inbound = Instant::now();

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Publish(frame)) => {
                        if !send(&link, &frame) {
                            self.report_error("Connection closed while publishing".to_string());
                            return Exit::Lost;
                        }
                    }
                    Some(SessionCommand::Disconnect) | None => {
                        tracing::info!("Disconnecting '{}'", self.user_id);
                        send(&link, &Frame::disconnect());
                        return Exit::Requested;
                    }
                },
                inbound = link.incoming.recv() => match inbound {
                    Some(Ok(text)) => {
                        last_inbound = Instant::now();
                        let items = match decoder.feed(text.as_bytes()) {
                            Ok(items) => items,
                            Err(e) => {
                                self.report_error(format!("Invalid STOMP data from broker: {}", e));
                                return Exit::Lost;
                            }
                        };
                        for item in items {
                            if let Inbound::Frame(frame) = item
                                && let Some(exit) = self.handle_frame(frame).await
                            {
                                return exit;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        self.report_error(e.to_string());
                        return Exit::Lost;
                    }
                    None => {
                        self.report_error("Connection closed by broker".to_string());
                        return Exit::Lost;
                    }
                },
                _ = tick(&mut heartbeat) => {
                    if link.outgoing.send(HEARTBEAT_EOL.to_string()).is_err() {
                        self.report_error("Connection closed while sending heart-beat".to_string());
                        return Exit::Lost;
                    }
                }
                _ = tick(&mut watchdog) => {
                    if let Some(timeout) = read_timeout
                        && last_inbound.elapsed() > timeout
                    {
                        self.report_error(format!(
                            "No heart-beat from broker for {} ms",
                            timeout.as_millis()
                        ));
                        return Exit::Lost;
                    }
                }
            }
        }
    }

    async fn handle_frame(&mut self, frame: Frame) -> Option<Exit> {
        match frame.command {
            Command::Message => {
                self.deliver(frame).await;
                None
            }
            Command::Error => {
                let message = frame.header("message").unwrap_or("no message");
                let detail = frame.body.trim();
                if detail.is_empty() {
                    self.report_error(format!("Broker error: {}", message));
                } else {
                    self.report_error(format!("Broker error: {} ({})", message, detail));
                }
                Some(Exit::Lost)
            }
            Command::Receipt => {
                tracing::debug!("Receipt {:?}", frame.header("receipt-id"));
                None
            }
            other => {
                tracing::debug!("Ignoring unexpected {} frame", other);
                None
            }
        }
    }

    /// Append a MESSAGE payload to the sequence its subscription feeds.
    async fn deliver(&mut self, frame: Frame) {
        let destination = frame.header("destination").unwrap_or_default().to_string();
        let Some(channel) = frame
            .header("subscription")
            .and_then(Channel::from_subscription_id)
        else {
            tracing::debug!("Ignoring MESSAGE for unknown subscription on '{}'", destination);
            return;
        };

        let delivered = {
            let mut state = self.state.lock().await;
            match channel {
                Channel::PublicChat => {
                    serde_json::from_str::<ChatMessage>(&frame.body).map(|message| {
                        state.messages.push(message.clone());
                        SessionEvent::MessageReceived(message)
                    })
                }
                Channel::UserNotifications | Channel::BroadcastNotifications => {
                    serde_json::from_str::<Notification>(&frame.body).map(|notification| {
                        state.notifications.push(notification.clone());
                        SessionEvent::NotificationReceived(notification)
                    })
                }
            }
        };

        match delivered {
            Ok(event) => self.emit(event),
            Err(e) => {
                tracing::warn!("Dropping malformed payload on '{}': {}", destination, e);
                self.emit(SessionEvent::MalformedPayload {
                    destination,
                    error: e.to_string(),
                });
            }
        }
    }

    async fn set_connected(&self, connected: bool) {
        self.state.lock().await.is_connected = connected;
    }

    fn report_error(&self, reason: String) {
        tracing::warn!("{}", reason);
        self.emit(SessionEvent::Error(reason));
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine: nobody is watching this session.
        let _ = self.events.send(event);
    }
}

fn send(link: &TransportLink, frame: &Frame) -> bool {
    link.outgoing.send(frame.encode()).is_ok()
}

/// Run `future` unless a disconnect arrives first.
///
/// Publishes received meanwhile are dropped: the session is not connected.
async fn race_disconnect<F: Future>(
    commands: &mut mpsc::UnboundedReceiver<SessionCommand>,
    future: F,
) -> Option<F::Output> {
    tokio::pin!(future);
    loop {
        tokio::select! {
            output = &mut future => return Some(output),
            command = commands.recv() => match command {
                Some(SessionCommand::Publish(frame)) => tracing::debug!(
                    "Not connected; dropping publish to {}",
                    frame.header("destination").unwrap_or("?")
                ),
                Some(SessionCommand::Disconnect) | None => return None,
            },
        }
    }
}

/// Wait for CONNECTED; frames decoded after it are returned as backlog.
async fn await_connected(
    incoming: &mut mpsc::UnboundedReceiver<InboundText>,
    decoder: &mut FrameDecoder,
) -> Result<(Frame, Vec<Frame>), String> {
    loop {
        let text = match incoming.recv().await {
            Some(Ok(text)) => text,
            Some(Err(e)) => return Err(e.to_string()),
            None => return Err("Connection closed during STOMP handshake".to_string()),
        };
        let items = decoder
            .feed(text.as_bytes())
            .map_err(|e| format!("Invalid STOMP data from broker: {}", e))?;

        let mut frames = items.into_iter().filter_map(|item| match item {
            Inbound::Frame(frame) => Some(frame),
            Inbound::Heartbeat => None,
        });
        while let Some(frame) = frames.next() {
            match frame.command {
                Command::Connected => return Ok((frame, frames.collect())),
                Command::Error => {
                    return Err(format!(
                        "Broker rejected connection: {}",
                        frame.header("message").unwrap_or("no reason given")
                    ));
                }
                other => tracing::debug!("Ignoring {} frame before CONNECTED", other),
            }
        }
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_shared::stomp::HeartBeat;

    fn inbound_channel(
        texts: Vec<InboundText>,
    ) -> mpsc::UnboundedReceiver<InboundText> {
        let (tx, rx) = mpsc::unbounded_channel();
        for text in texts {
            tx.send(text).unwrap();
        }
        rx
    }

    #[tokio::test]
    async fn test_await_connected_returns_trailing_frames_as_backlog() {
        // テスト項目: CONNECTED と同じチャンクに続くフレームはバックログとして返される
        // given (前提条件):
        let chunk = format!(
            "\n{}{}",
            Frame::connected(HeartBeat::new(0, 0), "test").encode(),
            Frame::receipt("r-1").encode()
        );
        let mut incoming = inbound_channel(vec![Ok(chunk)]);
        let mut decoder = FrameDecoder::new();

        // when (操作):
        let result = await_connected(&mut incoming, &mut decoder).await;

        // then (期待する結果):
        let (connected, backlog) = result.unwrap();
        assert_eq!(connected.command, Command::Connected);
        assert_eq!(backlog.len(), 1);
        assert_eq!(backlog[0].command, Command::Receipt);
    }

    #[tokio::test]
    async fn test_await_connected_reports_broker_rejection() {
        // テスト項目: ハンドシェイク中の ERROR フレームは接続拒否として報告される
        // given (前提条件):
        let error = Frame::error("Unsupported protocol version", "");
        let mut incoming = inbound_channel(vec![Ok(error.encode())]);
        let mut decoder = FrameDecoder::new();

        // when (操作):
        let result = await_connected(&mut incoming, &mut decoder).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            "Broker rejected connection: Unsupported protocol version"
        );
    }

    #[tokio::test]
    async fn test_await_connected_reports_closed_transport() {
        // テスト項目: ハンドシェイク前に切断された場合はエラーになる
        // given (前提条件):
        let mut incoming = inbound_channel(vec![]);
        let mut decoder = FrameDecoder::new();

        // when (操作):
        let result = await_connected(&mut incoming, &mut decoder).await;

        // then (期待する結果):
        assert!(result.unwrap_err().contains("closed during STOMP handshake"));
    }

    #[tokio::test]
    async fn test_race_disconnect_drops_publishes_and_stops_on_disconnect() {
        // テスト項目: 待機中の publish は破棄され、disconnect で待機が中断される
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(SessionCommand::Publish(Frame::send("/app/x", "{}")))
            .unwrap();
        tx.send(SessionCommand::Disconnect).unwrap();

        // when (操作):
        let result = race_disconnect(&mut rx, std::future::pending::<()>()).await;

        // then (期待する結果):
        assert!(result.is_none());
        assert!(rx.try_recv().is_err());
    }
}
