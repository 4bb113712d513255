//! Typed wrappers over [`Session::call`](substrpc_ws::Session::call), one
//! module per RPC namespace.
//!
//! Calls with a fixed result shape return the types from
//! [`crate::types`]; everything else is returned as [`serde_json::Value`].
//! An optional `at` block hash is sent as `null` when absent, which the node
//! reads as "best block".

pub mod author;
pub mod babe;
pub mod chain;
pub mod childstate;
pub mod contracts;
pub mod engine;
pub mod grandpa;
pub mod offchain;
pub mod payment;
pub mod state;
pub mod sync_state;
pub mod system;

use serde_json::Value;

use crate::types::H256;

/// Optional block hash parameter.
pub(crate) fn at(hash: Option<H256>) -> Value {
    hash.map(Value::from).unwrap_or(Value::Null)
}
