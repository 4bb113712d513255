//! `engine_*`: manual seal block authoring (dev nodes only).

use serde_json::{json, Value};

use substrpc_core::error::SessionError;
use substrpc_ws::Session;

use crate::types::H256;

/// Seal a new block, optionally on top of `parent_hash`.
pub async fn create_block(
    session: &Session,
    create_empty: bool,
    finalize: bool,
    parent_hash: Option<H256>,
) -> Result<Value, SessionError> {
    session
        .call(
            "engine_createBlock",
            vec![json!(create_empty), json!(finalize), super::at(parent_hash)],
        )
        .await
}

pub async fn finalize_block(
    session: &Session,
    hash: H256,
    justification: Option<&str>,
) -> Result<bool, SessionError> {
    let justification = justification.map(|j| json!(j)).unwrap_or(Value::Null);
    session
        .request("engine_finalizeBlock", vec![hash.into(), justification])
        .await
}
