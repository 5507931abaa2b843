//! WebSocket transport built on tokio-tungstenite.

use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{net::TcpStream, sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use super::{Connector, InboundText, TransportError, TransportLink};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects over a real WebSocket
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<TransportLink, TransportError> {
        let (ws_stream, response) =
            connect_async(url)
                .await
                .map_err(|e| TransportError::ConnectFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
        tracing::debug!(
            "WebSocket handshake with {} completed (HTTP {})",
            url,
            response.status().as_u16()
        );

        let (write, read) = ws_stream.split();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();

        writer_loop(outgoing_rx, write);
        reader_loop(read, incoming_tx);

        Ok(TransportLink {
            outgoing: outgoing_tx,
            incoming: incoming_rx,
        })
    }
}

/// Forwards queued text to the socket; closes it once the link is dropped.
fn writer_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut write: SplitSink<WsStream, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if let Err(e) = write.send(Message::Text(text.into())).await {
                tracing::warn!("Failed to write to WebSocket: {}", e);
                return;
            }
        }
        if let Err(e) = write.close().await {
            tracing::debug!("WebSocket close failed: {}", e);
        }
    })
}

/// Forwards socket text to the link until either side goes away.
fn reader_loop(
    mut read: SplitStream<WsStream>,
    tx: mpsc::UnboundedSender<InboundText>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = read.next().await {
            let forwarded = match message {
                Ok(Message::Text(text)) => Ok(text.as_str().to_string()),
                Ok(Message::Binary(data)) => Ok(String::from_utf8_lossy(&data).into_owned()),
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Ok(_) => continue,
                Err(e) => Err(TransportError::Io(e.to_string())),
            };

            let failed = forwarded.is_err();
            if tx.send(forwarded).is_err() || failed {
                break;
            }
        }
    })
}
