//! In-memory transport.
//!
//! [`pair`] returns a client [`Connection`] and the [`RemoteEnd`] that plays
//! the node: it reads what the client wrote and pushes responses and
//! notifications back. Used by tests and by embedders that bridge to a
//! non-WebSocket carrier.

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use substrpc_core::error::TransportError;
use substrpc_core::request::{JsonRpcRequest, SubscriptionId};
use substrpc_core::transport::{Connection, Connector, Endpoint, FrameSink, FrameStream};

/// Create a connected client/node pair.
pub fn pair() -> (Connection, RemoteEnd) {
    let (to_node, from_client) = mpsc::unbounded_channel::<String>();
    let (to_client, from_node) = mpsc::unbounded_channel::<Result<String, TransportError>>();

    let frames = futures::stream::unfold(from_node, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    })
    .boxed() as FrameStream;
    let sink = MemorySink { tx: Some(to_node) };
    (
        Connection::new(Box::new(sink), frames),
        RemoteEnd { from_client, to_client: Some(to_client) },
    )
}

struct MemorySink {
    tx: Option<mpsc::UnboundedSender<String>>,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Disconnected)?;
        tx.send(frame).map_err(|_| TransportError::Disconnected)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.tx = None;
        Ok(())
    }
}

/// The node side of an in-memory connection.
pub struct RemoteEnd {
    from_client: mpsc::UnboundedReceiver<String>,
    to_client: Option<mpsc::UnboundedSender<Result<String, TransportError>>>,
}

impl RemoteEnd {
    /// Next raw frame written by the client; `None` once the client closed.
    pub async fn recv(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Next frame written by the client, parsed as a request.
    ///
    /// # Panics
    /// If the client wrote something that is not a JSON-RPC request.
    pub async fn recv_request(&mut self) -> Option<JsonRpcRequest> {
        let frame = self.recv().await?;
        Some(serde_json::from_str(&frame).unwrap_or_else(|e| panic!("bad request frame {frame}: {e}")))
    }

    /// Push a raw frame to the client. Returns `false` if the client is gone.
    pub fn send_raw(&self, frame: impl Into<String>) -> bool {
        match &self.to_client {
            Some(tx) => tx.send(Ok(frame.into())).is_ok(),
            None => false,
        }
    }

    /// Answer request `id` with `result`.
    pub fn respond(&self, id: u64, result: Value) -> bool {
        self.send_raw(json!({"jsonrpc": "2.0", "id": id, "result": result}).to_string())
    }

    /// Answer request `id` with an error object.
    pub fn respond_error(&self, id: u64, code: i64, message: &str, data: Option<Value>) -> bool {
        let mut error = json!({"code": code, "message": message});
        if let Some(data) = data {
            error["data"] = data;
        }
        self.send_raw(json!({"jsonrpc": "2.0", "id": id, "error": error}).to_string())
    }

    /// Push a subscription notification.
    pub fn notify(&self, method: &str, subscription: &SubscriptionId, result: Value) -> bool {
        self.send_raw(
            json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": {"subscription": subscription.to_value(), "result": result},
            })
            .to_string(),
        )
    }

    /// Inject a transport failure into the client's frame stream.
    pub fn fail(&self, reason: &str) -> bool {
        match &self.to_client {
            Some(tx) => tx.send(Err(TransportError::WebSocket(reason.into()))).is_ok(),
            None => false,
        }
    }

    /// Close the node side. The client sees end-of-stream.
    pub fn close(&mut self) {
        self.to_client = None;
    }
}

/// A [`Connector`] handing out in-memory connections.
///
/// Every successful `connect` delivers the matching [`RemoteEnd`] on the
/// receiver returned by [`MemoryConnector::new`]. Failures can be queued to
/// simulate an unreachable node.
pub struct MemoryConnector {
    remotes: mpsc::UnboundedSender<RemoteEnd>,
    failures: Mutex<u32>,
}

impl MemoryConnector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RemoteEnd>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { remotes: tx, failures: Mutex::new(0) }, rx)
    }

    /// Make the next `n` connects fail.
    pub fn fail_next(&self, n: u32) {
        *self.failures.lock() = n;
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Connection, TransportError> {
        {
            let mut failures = self.failures.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(TransportError::Connect {
                    url: endpoint.url.clone(),
                    reason: "connection refused".into(),
                });
            }
        }
        let (conn, remote) = pair();
        self.remotes.send(remote).map_err(|_| TransportError::Connect {
            url: endpoint.url.clone(),
            reason: "no node listening".into(),
        })?;
        Ok(conn)
    }
}
