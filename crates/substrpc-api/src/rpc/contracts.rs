//! `contracts_*`: smart-contract pallet queries.

use serde_json::{json, Value};

use substrpc_core::error::SessionError;
use substrpc_ws::Session;

use crate::types::H256;

/// Dry-run a contract call. `request` is the node's `CallRequest` object
/// (`origin`, `dest`, `value`, `gasLimit`, `inputData`).
pub async fn call(session: &Session, request: Value, at: Option<H256>) -> Result<Value, SessionError> {
    session.call("contracts_call", vec![request, super::at(at)]).await
}

pub async fn get_storage(
    session: &Session,
    address: &str,
    key: &str,
    at: Option<H256>,
) -> Result<Option<String>, SessionError> {
    session
        .request("contracts_getStorage", vec![json!(address), json!(key), super::at(at)])
        .await
}

pub async fn rent_projection(session: &Session, address: &str, at: Option<H256>) -> Result<Value, SessionError> {
    session
        .call("contracts_rentProjection", vec![json!(address), super::at(at)])
        .await
}
