//! `childstate_*`: child trie storage. `child_key` is the prefixed child
//! storage key.

use serde_json::json;

use substrpc_core::error::SessionError;
use substrpc_ws::Session;

use crate::types::H256;

pub async fn get_keys(
    session: &Session,
    child_key: &str,
    prefix: &str,
    at: Option<H256>,
) -> Result<Vec<String>, SessionError> {
    session
        .request("childstate_getKeys", vec![json!(child_key), json!(prefix), super::at(at)])
        .await
}

pub async fn get_storage(
    session: &Session,
    child_key: &str,
    key: &str,
    at: Option<H256>,
) -> Result<Option<String>, SessionError> {
    session
        .request("childstate_getStorage", vec![json!(child_key), json!(key), super::at(at)])
        .await
}

pub async fn get_storage_hash(
    session: &Session,
    child_key: &str,
    key: &str,
    at: Option<H256>,
) -> Result<Option<H256>, SessionError> {
    session
        .request("childstate_getStorageHash", vec![json!(child_key), json!(key), super::at(at)])
        .await
}

pub async fn get_storage_size(
    session: &Session,
    child_key: &str,
    key: &str,
    at: Option<H256>,
) -> Result<Option<u64>, SessionError> {
    session
        .request("childstate_getStorageSize", vec![json!(child_key), json!(key), super::at(at)])
        .await
}
