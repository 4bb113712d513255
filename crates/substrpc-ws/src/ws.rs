//! WebSocket transport backed by `tokio-tungstenite`.

use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use substrpc_core::error::TransportError;
use substrpc_core::transport::{Connection, Connector, Endpoint, FrameSink, FrameStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens `ws://` / `wss://` connections.
#[derive(Debug, Clone)]
pub struct WsConnector {
    max_frame_bytes: usize,
}

impl WsConnector {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self { max_frame_bytes }
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new(16 * 1024 * 1024)
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Connection, TransportError> {
        tracing::info!(url = %endpoint, "connecting via WebSocket");

        let mut config = WebSocketConfig::default();
        config.max_message_size = Some(self.max_frame_bytes);
        config.max_frame_size = Some(self.max_frame_bytes);

        let (ws, _) = tokio_tungstenite::connect_async_with_config(&endpoint.url, Some(config), false)
            .await
            .map_err(|e| TransportError::Connect {
                url: endpoint.url.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!(url = %endpoint, "WebSocket connected");
        let (write, read) = ws.split();

        // Text frames only. Pongs are answered by tungstenite on the next
        // read; a Close frame ends the stream.
        let frames = futures::stream::unfold(read, |mut read| async move {
            loop {
                match read.next().await {
                    None => return None,
                    Some(Err(e)) => {
                        return Some((Err(TransportError::WebSocket(e.to_string())), read));
                    }
                    Some(Ok(Message::Text(text))) => return Some((Ok(text.to_string()), read)),
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "WebSocket closed by server");
                        return None;
                    }
                    Some(Ok(_)) => {} // binary / ping / pong
                }
            }
        });

        Ok(Connection::new(
            Box::new(WsSink { inner: write, closed: false }),
            Box::pin(frames) as FrameStream,
        ))
    }
}

struct WsSink {
    inner: SplitSink<WsStream, Message>,
    closed: bool,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Disconnected);
        }
        self.inner
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.inner
            .close()
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))
    }
}
