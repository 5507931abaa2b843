//! In-process transport for driving a session without a network.
//!
//! Every `connect` hands a [`LoopbackPeer`] to whoever holds the receiver
//! returned by [`LoopbackConnector::new`]; the peer plays the broker.

use std::{
    collections::VecDeque,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use hearth_shared::stomp::{Frame, FrameDecoder, Inbound};
use tokio::sync::mpsc;

use super::{Connector, InboundText, TransportError, TransportLink};

pub struct LoopbackConnector {
    peers: mpsc::UnboundedSender<LoopbackPeer>,
    refusing: AtomicBool,
}

impl LoopbackConnector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LoopbackPeer>) {
        let (peers, accepted) = mpsc::unbounded_channel();
        let connector = Self {
            peers,
            refusing: AtomicBool::new(false),
        };
        (connector, accepted)
    }

    /// While refusing, every `connect` fails as if nothing were listening
    pub fn set_refusing(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for LoopbackConnector {
    async fn connect(&self, url: &str) -> Result<TransportLink, TransportError> {
        let refused = |reason: &str| TransportError::ConnectFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        };
        if self.refusing.load(Ordering::SeqCst) {
            return Err(refused("connection refused"));
        }

        let (outgoing, from_client) = mpsc::unbounded_channel();
        let (to_client, incoming) = mpsc::unbounded_channel();
        let peer = LoopbackPeer {
            url: url.to_string(),
            from_client,
            to_client,
            decoder: FrameDecoder::new(),
            pending: VecDeque::new(),
        };
        self.peers
            .send(peer)
            .map_err(|_| refused("no loopback peer is accepting"))?;

        Ok(TransportLink { outgoing, incoming })
    }
}

/// Broker side of a loopback connection.
///
/// Dropping it closes the connection from the client's point of view.
pub struct LoopbackPeer {
    url: String,
    from_client: mpsc::UnboundedReceiver<String>,
    to_client: mpsc::UnboundedSender<InboundText>,
    decoder: FrameDecoder,
    pending: VecDeque<Frame>,
}

impl LoopbackPeer {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Next raw text written by the client (frames and heart-beats)
    pub async fn recv_raw(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Next frame written by the client, skipping heart-beats.
    ///
    /// Returns `None` once the client has closed the link or sent
    /// undecodable data.
    pub async fn recv_frame(&mut self) -> Option<Frame> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Some(frame);
            }
            let text = self.from_client.recv().await?;
            match self.decoder.feed(text.as_bytes()) {
                Ok(items) => self.pending.extend(items.into_iter().filter_map(|item| match item {
                    Inbound::Frame(frame) => Some(frame),
                    Inbound::Heartbeat => None,
                })),
                Err(e) => {
                    tracing::warn!("Loopback peer received invalid STOMP data: {}", e);
                    return None;
                }
            }
        }
    }

    pub fn send_frame(&self, frame: &Frame) -> bool {
        self.send_raw(frame.encode())
    }

    pub fn send_raw(&self, text: impl Into<String>) -> bool {
        self.to_client.send(Ok(text.into())).is_ok()
    }

    /// Break the connection with a transport error
    pub fn fail(&self, reason: &str) -> bool {
        self.to_client
            .send(Err(TransportError::Io(reason.to_string())))
            .is_ok()
    }
}
