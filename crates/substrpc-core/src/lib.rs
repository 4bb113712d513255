//! substrpc-core: foundation traits and types for SubstRPC.
//!
//! # Overview
//!
//! SubstRPC is a JSON-RPC client for Substrate-style nodes. The core crate
//! defines:
//!
//! - [`Connector`] / [`FrameSink`]: the duplex transport abstraction
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] / [`Notification`]: wire types
//! - [`TransportError`] / [`SessionError`]: structured error types
//! - [`SessionConfig`]: serde-loadable session settings
//! - [`backoff`] module: caller-side reconnect backoff

pub mod backoff;
pub mod config;
pub mod error;
pub mod request;
pub mod transport;

pub use backoff::ReconnectPolicy;
pub use config::{ReconnectConfig, SessionConfig};
pub use error::{SessionError, TransportError};
pub use request::{
    IncomingFrame, JsonRpcError, JsonRpcRequest, JsonRpcResponse, Notification, RpcId, RpcParam,
    SubscriptionId,
};
pub use transport::{Connection, ConnectionState, Connector, Endpoint, FrameSink, FrameStream};
