//! `offchain_*`: offchain worker local storage.

use serde_json::{json, Value};

use substrpc_core::error::SessionError;
use substrpc_ws::Session;

use crate::types::StorageKind;

pub async fn local_storage_set(
    session: &Session,
    kind: StorageKind,
    key: &str,
    value: &str,
) -> Result<Value, SessionError> {
    session
        .call("offchain_localStorageSet", vec![json!(kind), json!(key), json!(value)])
        .await
}

pub async fn local_storage_get(
    session: &Session,
    kind: StorageKind,
    key: &str,
) -> Result<Option<String>, SessionError> {
    session
        .request("offchain_localStorageGet", vec![json!(kind), json!(key)])
        .await
}
