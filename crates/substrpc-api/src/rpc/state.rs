//! `state_*`: storage queries, runtime calls and runtime metadata.

use serde_json::{json, Value};

use substrpc_core::error::SessionError;
use substrpc_ws::{Session, SubscriptionStream};

use crate::types::{RuntimeVersion, StorageChangeSet, H256};

/// Call a runtime API function with SCALE-encoded `data`.
pub async fn call(session: &Session, method: &str, data: &str, at: Option<H256>) -> Result<String, SessionError> {
    session
        .request("state_call", vec![json!(method), json!(data), super::at(at)])
        .await
}

/// All key/value pairs under `prefix`.
pub async fn get_pairs(session: &Session, prefix: &str, at: Option<H256>) -> Result<Vec<(String, String)>, SessionError> {
    session
        .request("state_getPairs", vec![json!(prefix), super::at(at)])
        .await
}

/// Up to `count` keys under `prefix`, starting after `start_key`.
pub async fn get_keys_paged(
    session: &Session,
    prefix: &str,
    count: u32,
    start_key: Option<&str>,
    at: Option<H256>,
) -> Result<Vec<String>, SessionError> {
    let start = start_key.map(|k| json!(k)).unwrap_or(Value::Null);
    session
        .request(
            "state_getKeysPaged",
            vec![json!(prefix), json!(count), start, super::at(at)],
        )
        .await
}

/// Hex-encoded storage value, `None` if the key is empty.
pub async fn get_storage(session: &Session, key: &str, at: Option<H256>) -> Result<Option<String>, SessionError> {
    session
        .request("state_getStorage", vec![json!(key), super::at(at)])
        .await
}

pub async fn get_storage_hash(session: &Session, key: &str, at: Option<H256>) -> Result<Option<H256>, SessionError> {
    session
        .request("state_getStorageHash", vec![json!(key), super::at(at)])
        .await
}

pub async fn get_storage_size(session: &Session, key: &str, at: Option<H256>) -> Result<Option<u64>, SessionError> {
    session
        .request("state_getStorageSize", vec![json!(key), super::at(at)])
        .await
}

/// SCALE-encoded runtime metadata.
pub async fn get_metadata(session: &Session, at: Option<H256>) -> Result<String, SessionError> {
    session.request("state_getMetadata", vec![super::at(at)]).await
}

pub async fn get_runtime_version(session: &Session, at: Option<H256>) -> Result<RuntimeVersion, SessionError> {
    session
        .request("state_getRuntimeVersion", vec![super::at(at)])
        .await
}

/// Changes to `keys` between blocks `from` and `to` (inclusive).
pub async fn query_storage(
    session: &Session,
    keys: &[String],
    from: H256,
    to: Option<H256>,
) -> Result<Vec<StorageChangeSet>, SessionError> {
    session
        .request("state_queryStorage", vec![json!(keys), from.into(), super::at(to)])
        .await
}

/// Merkle proof of `keys` at block `at`.
pub async fn get_read_proof(session: &Session, keys: &[String], at: Option<H256>) -> Result<Value, SessionError> {
    session
        .call("state_getReadProof", vec![json!(keys), super::at(at)])
        .await
}

pub async fn subscribe_runtime_version(
    session: &Session,
) -> Result<SubscriptionStream<RuntimeVersion>, SessionError> {
    session
        .subscribe_stream(
            "state_subscribeRuntimeVersion",
            vec![],
            "state_unsubscribeRuntimeVersion",
        )
        .await
}

/// Changes to `keys`; the first notification carries their current values.
pub async fn subscribe_storage(
    session: &Session,
    keys: &[String],
) -> Result<SubscriptionStream<StorageChangeSet>, SessionError> {
    session
        .subscribe_stream("state_subscribeStorage", vec![json!(keys)], "state_unsubscribeStorage")
        .await
}
