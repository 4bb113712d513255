//! JSON-RPC session over a single connection.
//!
//! Two background tasks own the connection: a writer that serializes all
//! outgoing frames, and a reader that routes responses to their callers by
//! id and notifications to the subscription registry. Callers only ever
//! touch the pending table and the write queue.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time;

use substrpc_core::backoff::ReconnectPolicy;
use substrpc_core::config::SessionConfig;
use substrpc_core::error::SessionError;
use substrpc_core::request::{IncomingFrame, JsonRpcRequest, JsonRpcResponse, RpcParam, SubscriptionId};
use substrpc_core::transport::{Connection, ConnectionState, Connector, Endpoint, FrameSink, FrameStream};

use crate::subscriptions::{
    PendingSubscription, SubscriptionControl, SubscriptionHandle, SubscriptionRegistry, SubscriptionStream,
};
use crate::ws::WsConnector;

type Reply = oneshot::Sender<Result<Value, SessionError>>;

/// A request waiting for its response.
struct Pending {
    method: String,
    tx: Reply,
    subscription: Option<SubscribeRequest>,
}

/// Extra state carried by a subscribe request until the node assigns an id.
struct SubscribeRequest {
    unsubscribe_method: String,
    entry: PendingSubscription,
}

#[derive(Default)]
struct PendingTable {
    closed: bool,
    map: HashMap<u64, Pending>,
}

/// State shared between the session handle and its background tasks.
struct Shared {
    next_id: AtomicU64,
    pending: Mutex<PendingTable>,
    registry: SubscriptionRegistry,
    write_tx: mpsc::Sender<String>,
    state: watch::Sender<ConnectionState>,
}

impl Shared {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Insert a pending request unless the session has already closed.
    fn register(&self, id: u64, pending: Pending) -> Result<(), SessionError> {
        let mut table = self.pending.lock();
        if table.closed {
            return Err(SessionError::disconnected());
        }
        table.map.insert(id, pending);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.pending.lock().closed
    }

    /// Fail every pending request, drop every subscription and mark the
    /// connection closed. Idempotent.
    fn shutdown(&self) {
        let drained = {
            let mut table = self.pending.lock();
            if table.closed {
                return;
            }
            table.closed = true;
            std::mem::take(&mut table.map)
        };
        if !drained.is_empty() {
            tracing::debug!(pending = drained.len(), "failing pending requests on close");
        }
        for (_, pending) in drained {
            let _ = pending.tx.send(Err(SessionError::disconnected()));
        }
        self.registry.clear();
        self.state.send_replace(ConnectionState::Closed);
    }

    /// Queue a request whose response nobody waits for.
    fn send_detached(&self, method: &str, params: Vec<RpcParam>) {
        if self.is_closed() {
            return;
        }
        let id = self.next_id();
        let frame = match serde_json::to_string(&JsonRpcRequest::new(id, method, params)) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(method, error = %e, "could not serialize request");
                return;
            }
        };
        if self.write_tx.try_send(frame).is_err() {
            tracing::warn!(id, method, "write queue unavailable; request dropped");
        } else {
            tracing::debug!(id, method, "sent without awaiting response");
        }
    }

    fn handle_frame(&self, text: &str) {
        match IncomingFrame::parse(text) {
            Ok(IncomingFrame::Response(resp)) => self.handle_response(resp),
            Ok(IncomingFrame::Notification(n)) => {
                self.registry.dispatch(&n.params.subscription, n.params.result);
            }
            Err(e) => tracing::warn!(error = %e, "dropping unrecognised frame"),
        }
    }

    fn handle_response(&self, resp: JsonRpcResponse) {
        let Some(id) = resp.id.as_u64() else {
            tracing::debug!(id = %resp.id, "response with foreign id dropped");
            return;
        };
        let Some(pending) = self.pending.lock().map.remove(&id) else {
            tracing::debug!(id, "response for unknown or expired request dropped");
            return;
        };
        let outcome = resp.into_result().map_err(SessionError::Rpc);
        match pending.subscription {
            None => {
                let _ = pending.tx.send(outcome);
            }
            Some(sub) => self.confirm_subscription(&pending.method, pending.tx, sub, outcome),
        }
    }

    /// Register a confirmed subscription before the next frame is read, so
    /// notifications that follow the response are never missed.
    fn confirm_subscription(
        &self,
        method: &str,
        tx: Reply,
        sub: SubscribeRequest,
        outcome: Result<Value, SessionError>,
    ) {
        let outcome = outcome.and_then(|value| match SubscriptionId::from_value(&value) {
            Some(id) => Ok((id, value)),
            None => Err(SessionError::Decode(format!(
                "{method} returned {value} instead of a subscription id"
            ))),
        });
        match outcome {
            Ok((id, value)) => {
                tracing::debug!(subscription = %id, method, "subscription active");
                let control = Arc::clone(&sub.entry.control);
                self.registry.activate(id.clone(), sub.entry);
                // caller went away while waiting; whoever removes the entry unsubscribes
                if (tx.send(Ok(value)).is_err() || control.is_cancelled()) && self.registry.remove(&id) {
                    self.send_detached(&sub.unsubscribe_method, vec![id.to_value()]);
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e));
            }
        }
    }
}

/// Resolves once the state reaches `Closed`.
async fn closed_signal(mut state: watch::Receiver<ConnectionState>) {
    while *state.borrow_and_update() != ConnectionState::Closed {
        if state.changed().await.is_err() {
            return;
        }
    }
}

async fn read_loop(shared: Arc<Shared>, mut frames: FrameStream) {
    let closed = closed_signal(shared.state.subscribe());
    tokio::pin!(closed);
    loop {
        tokio::select! {
            frame = frames.next() => match frame {
                Some(Ok(text)) => shared.handle_frame(&text),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "transport error, closing session");
                    break;
                }
                None => {
                    tracing::info!("connection closed by peer");
                    break;
                }
            },
            _ = &mut closed => break,
        }
    }
    shared.shutdown();
}

async fn write_loop(shared: Arc<Shared>, mut sink: Box<dyn FrameSink>, mut rx: mpsc::Receiver<String>) {
    let closed = closed_signal(shared.state.subscribe());
    tokio::pin!(closed);
    loop {
        tokio::select! {
            biased;
            _ = &mut closed => break,
            frame = rx.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = sink.send(frame).await {
                        tracing::warn!(error = %e, "write failed, closing session");
                        shared.shutdown();
                        break;
                    }
                }
                None => break,
            },
        }
    }
    if let Err(e) = sink.close().await {
        tracing::debug!(error = %e, "error closing sink");
    }
}

/// Removes a request from the pending table when its caller stops waiting.
struct PendingGuard<'a> {
    shared: &'a Shared,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.shared.pending.lock().map.remove(&self.id);
    }
}

/// Tears down a subscription whose `subscribe` call was abandoned after the
/// node confirmed it but before the caller received the handle.
struct SubscribeGuard<'a> {
    shared: &'a Shared,
    control: Arc<SubscriptionControl>,
    unsubscribe_method: &'a str,
    armed: bool,
}

impl Drop for SubscribeGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.control.cancel_now();
        if let Some(id) = self.shared.registry.remove_by_control(&self.control) {
            tracing::debug!(subscription = %id, "subscribe abandoned after confirmation");
            self.shared
                .send_detached(self.unsubscribe_method, vec![id.to_value()]);
        }
    }
}

struct Inner {
    shared: Arc<Shared>,
    endpoint: Endpoint,
    config: SessionConfig,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}

/// A JSON-RPC session with one node.
///
/// Cheap to clone; all clones share the connection. The connection closes
/// when [`close`](Self::close) is called, when the peer goes away, or when
/// the last clone (and the last subscription handle) is dropped.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Connect through `connector` and start the session.
    pub async fn connect(
        connector: &dyn Connector,
        endpoint: Endpoint,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let connection = connector.connect(&endpoint).await?;
        Ok(Self::from_connection(endpoint, connection, config))
    }

    /// Connect to a `ws://` or `wss://` URL.
    pub async fn connect_ws(url: impl Into<String>, config: SessionConfig) -> Result<Self, SessionError> {
        let connector = WsConnector::new(config.max_frame_bytes);
        Self::connect(&connector, Endpoint::new(url), config).await
    }

    /// Like [`connect`](Self::connect), retrying failed connection attempts
    /// according to `config.reconnect`. Requests are never retried.
    pub async fn connect_with_backoff(
        connector: &dyn Connector,
        endpoint: Endpoint,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let policy = ReconnectPolicy::new(config.reconnect.clone());
        let mut attempt = 0u32;
        loop {
            match connector.connect(&endpoint).await {
                Ok(connection) => return Ok(Self::from_connection(endpoint, connection, config)),
                Err(e) => {
                    attempt += 1;
                    let Some(delay) = policy.next_delay(attempt) else {
                        tracing::warn!(url = %endpoint, attempts = attempt, error = %e, "giving up connecting");
                        return Err(e.into());
                    };
                    tracing::warn!(url = %endpoint, error = %e, "connect failed, retrying in {delay:?}");
                    time::sleep(delay).await;
                }
            }
        }
    }

    /// Start a session over an already established connection.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_connection(endpoint: Endpoint, connection: Connection, config: SessionConfig) -> Self {
        let (write_tx, write_rx) = mpsc::channel(config.write_buffer.max(1));
        let (state, _) = watch::channel(ConnectionState::Connected);
        let shared = Arc::new(Shared {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(PendingTable::default()),
            registry: SubscriptionRegistry::new(),
            write_tx,
            state,
        });

        let Connection { sink, frames } = connection;
        tokio::spawn(write_loop(Arc::clone(&shared), sink, write_rx));
        tokio::spawn(read_loop(Arc::clone(&shared), frames));
        tracing::debug!(url = %endpoint, "session started");

        Self { inner: Arc::new(Inner { shared, endpoint, config }) }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.shared.state.borrow()
    }

    /// Live subscriptions of this session.
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.inner.shared.registry
    }

    /// Close the connection. Pending requests fail with a connection error.
    /// Calling it again has no effect.
    pub fn close(&self) {
        if !self.inner.shared.is_closed() {
            tracing::info!(url = %self.inner.endpoint, "closing session");
        }
        self.inner.shared.shutdown();
    }

    /// Resolves once the connection has closed, for whatever reason.
    pub async fn closed(&self) {
        closed_signal(self.inner.shared.state.subscribe()).await;
    }

    /// Call `method` with the session's default timeout.
    pub async fn call(&self, method: &str, params: Vec<RpcParam>) -> Result<Value, SessionError> {
        self.call_with_timeout(method, params, self.inner.config.request_timeout()).await
    }

    /// Call `method`, failing with [`SessionError::Timeout`] after `timeout`.
    /// A response arriving after the timeout is discarded.
    pub async fn call_with_timeout(
        &self,
        method: &str,
        params: Vec<RpcParam>,
        timeout: Duration,
    ) -> Result<Value, SessionError> {
        self.roundtrip(method, params, None, timeout).await
    }

    /// Call `method` and deserialize the result.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<RpcParam>,
    ) -> Result<T, SessionError> {
        let value = self.call(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Subscribe with `method`; `handler` is called for every notification,
    /// in order and never concurrently. `unsubscribe_method` is used when the
    /// handle is unsubscribed or dropped.
    pub async fn subscribe<F>(
        &self,
        method: &str,
        params: Vec<RpcParam>,
        unsubscribe_method: &str,
        handler: F,
    ) -> Result<SubscriptionHandle, SessionError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        let entry = PendingSubscription::spawn(method, handler);
        let control = Arc::clone(&entry.control);
        let mut guard = SubscribeGuard {
            shared: &*self.inner.shared,
            control: Arc::clone(&control),
            unsubscribe_method,
            armed: true,
        };
        let sub = SubscribeRequest { unsubscribe_method: unsubscribe_method.to_string(), entry };
        let timeout = self.inner.config.request_timeout();
        let value = self.roundtrip(method, params, Some(sub), timeout).await?;
        let id = SubscriptionId::from_value(&value)
            .ok_or_else(|| SessionError::Decode(format!("{method} returned {value} instead of a subscription id")))?;
        guard.armed = false;
        Ok(SubscriptionHandle::new(id, unsubscribe_method, control, self.clone()))
    }

    /// Subscribe and receive notifications as a typed stream.
    pub async fn subscribe_stream<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<RpcParam>,
        unsubscribe_method: &str,
    ) -> Result<SubscriptionStream<T>, SessionError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = self
            .subscribe(method, params, unsubscribe_method, move |value| {
                let _ = tx.send(value);
            })
            .await?;
        Ok(SubscriptionStream::new(handle, rx))
    }

    /// Fire-and-forget request, used when a handle is dropped.
    pub(crate) fn notify_best_effort(&self, method: &str, params: Vec<RpcParam>) {
        self.inner.shared.send_detached(method, params);
    }

    async fn roundtrip(
        &self,
        method: &str,
        params: Vec<RpcParam>,
        subscription: Option<SubscribeRequest>,
        timeout: Duration,
    ) -> Result<Value, SessionError> {
        let shared = &*self.inner.shared;
        let id = shared.next_id();
        let frame = serde_json::to_string(&JsonRpcRequest::new(id, method, params))?;

        let (tx, rx) = oneshot::channel();
        shared.register(id, Pending { method: method.to_string(), tx, subscription })?;
        let _guard = PendingGuard { shared, id };
        tracing::debug!(id, method, "sending request");

        let exchange = async {
            if shared.write_tx.send(frame).await.is_err() {
                return Err(SessionError::disconnected());
            }
            match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(SessionError::disconnected()),
            }
        };

        match time::timeout(timeout, exchange).await {
            Ok(outcome) => {
                if let Err(e) = &outcome {
                    tracing::debug!(id, method, error = %e, "request failed");
                }
                outcome
            }
            Err(_) => {
                let ms = timeout.as_millis() as u64;
                tracing::debug!(id, method, ms, "request timed out");
                Err(SessionError::Timeout { ms })
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.inner.endpoint)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory;
    use serde_json::json;

    fn session() -> (Session, memory::RemoteEnd) {
        let (conn, remote) = memory::pair();
        let session = Session::from_connection(Endpoint::new("memory://"), conn, SessionConfig::default());
        (session, remote)
    }

    #[tokio::test]
    async fn call_resolves_with_result() {
        let (session, mut node) = session();
        let call = tokio::spawn({
            let session = session.clone();
            async move { session.call("system_name", vec![]).await }
        });
        let req = node.recv_request().await.unwrap();
        assert_eq!(req.method, "system_name");
        node.respond(req.id.as_u64().unwrap(), json!("substrate-node"));
        assert_eq!(call.await.unwrap().unwrap(), json!("substrate-node"));
    }

    #[tokio::test]
    async fn ids_are_unique_and_increasing() {
        let (session, mut node) = session();
        for _ in 0..3 {
            let s = session.clone();
            tokio::spawn(async move { s.call("system_health", vec![]).await });
        }
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(node.recv_request().await.unwrap().id.as_u64().unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn error_response_surfaces_code() {
        let (session, mut node) = session();
        let call = tokio::spawn({
            let session = session.clone();
            async move { session.call("state_getStorage", vec![json!("0x00")]).await }
        });
        let req = node.recv_request().await.unwrap();
        node.respond_error(req.id.as_u64().unwrap(), -32602, "Invalid params", None);
        let err = call.await.unwrap().unwrap_err();
        assert_eq!(err.rpc_error().map(|e| e.code), Some(-32602));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (session, _node) = session();
        assert_eq!(session.state(), ConnectionState::Connected);
        session.close();
        session.close();
        session.closed().await;
        assert_eq!(session.state(), ConnectionState::Closed);
        let err = session.call("system_name", vec![]).await.unwrap_err();
        assert!(err.is_connection_error());
    }

    #[tokio::test]
    async fn peer_close_ends_session() {
        let (session, mut node) = session();
        node.close();
        session.closed().await;
        assert_eq!(session.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn typed_request() {
        let (session, mut node) = session();
        let call = tokio::spawn({
            let session = session.clone();
            async move { session.request::<u64>("system_accountNextIndex", vec![json!("5Grw")]).await }
        });
        let req = node.recv_request().await.unwrap();
        node.respond(req.id.as_u64().unwrap(), json!(7));
        assert_eq!(call.await.unwrap().unwrap(), 7);
    }
}
