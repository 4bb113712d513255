//! The transport abstraction: a duplex stream of text frames to one node.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::TransportError;

/// Lifecycle of a connection to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection has been attempted yet.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Frames flow in both directions.
    Connected,
    /// Closed locally or by the peer. Terminal for this connection.
    Closed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// A node endpoint, e.g. `ws://127.0.0.1:9944`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
}

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Incoming raw frames, infinite until the connection closes.
///
/// A `None` or an `Err` item both mean the connection is gone.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// Write half of a connection.
#[async_trait]
pub trait FrameSink: Send + 'static {
    /// Send one text frame.
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Close the connection. Calling this more than once is a no-op.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// An established connection, split into its two halves.
pub struct Connection {
    pub sink: Box<dyn FrameSink>,
    pub frames: FrameStream,
}

impl Connection {
    pub fn new(sink: Box<dyn FrameSink>, frames: FrameStream) -> Self {
        Self { sink, frames }
    }
}

/// Opens connections to endpoints.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn Connector>`.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Establish a new connection. Never reconnects on its own.
    async fn connect(&self, endpoint: &Endpoint) -> Result<Connection, TransportError>;
}
