//! substrpc-ws: JSON-RPC session over a shared duplex connection.
//!
//! # Features
//! - Request/response correlation by id, out-of-order safe
//! - Per-request timeouts; late responses are discarded
//! - Subscription multiplexing with ordered, non-overlapping handler calls
//! - Deterministic unsubscribe (no handler call after it returns)
//! - WebSocket transport (tokio-tungstenite) and an in-memory transport
//!
//! Reconnection is never automatic: when the connection closes, every
//! pending request and subscription fails with a connection error and the
//! caller opens a new [`Session`].

pub mod memory;
pub mod session;
pub mod subscriptions;
pub mod ws;

pub use session::Session;
pub use subscriptions::{SubscriptionHandle, SubscriptionRegistry, SubscriptionStream};
pub use ws::WsConnector;
