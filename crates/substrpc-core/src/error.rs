//! Transport- and session-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors raised by a transport connection.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The endpoint could not be reached (DNS, refused, handshake failure).
    #[error("Connection to {url} failed: {reason}")]
    Connect { url: String, reason: String },

    /// WebSocket send/receive error on an established connection.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The connection is closed; every outstanding operation fails with this.
    #[error("Disconnected")]
    Disconnected,
}

/// Errors that can occur during a session operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Transport unavailable. Fatal to all pending operations on the connection.
    #[error("Connection error: {0}")]
    Connection(#[from] TransportError),

    /// JSON-RPC application error reported by the node, surfaced verbatim.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Result payload did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Result could not be deserialized into the requested type.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl SessionError {
    /// Shorthand for the error every pending operation gets on close.
    pub fn disconnected() -> Self {
        Self::Connection(TransportError::Disconnected)
    }

    /// Returns `true` if the connection is gone and must be re-established.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if a caller-side policy may reasonably retry.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout { .. })
    }

    /// Returns the node's error object for `Rpc` errors.
    pub fn rpc_error(&self) -> Option<&JsonRpcError> {
        match self {
            Self::Rpc(e) => Some(e),
            _ => None,
        }
    }
}
