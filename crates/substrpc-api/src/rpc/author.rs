//! `author_*`: the transaction pool and session keys.
//!
//! Most callers want [`crate::extrinsic::Submitter`], which builds the
//! extrinsic and maps pool rejections; these are the raw calls.

use serde_json::{json, Value};

use substrpc_core::error::SessionError;
use substrpc_ws::{Session, SubscriptionStream};

use crate::extrinsic::TransactionStatus;
use crate::types::H256;

/// Submit a hex-encoded extrinsic; returns its hash.
pub async fn submit_extrinsic(session: &Session, extrinsic: &str) -> Result<H256, SessionError> {
    session
        .request("author_submitExtrinsic", vec![json!(extrinsic)])
        .await
}

/// Submit and follow the extrinsic through the pool.
pub async fn submit_and_watch_extrinsic(
    session: &Session,
    extrinsic: &str,
) -> Result<SubscriptionStream<TransactionStatus>, SessionError> {
    session
        .subscribe_stream(
            "author_submitAndWatchExtrinsic",
            vec![json!(extrinsic)],
            "author_unwatchExtrinsic",
        )
        .await
}

/// Hex-encoded extrinsics currently in the pool.
pub async fn pending_extrinsics(session: &Session) -> Result<Vec<String>, SessionError> {
    session.request("author_pendingExtrinsics", vec![]).await
}

/// Remove extrinsics from the pool by hash; returns the removed hashes.
pub async fn remove_extrinsic(session: &Session, hashes: &[H256]) -> Result<Vec<H256>, SessionError> {
    let items: Vec<Value> = hashes
        .iter()
        .map(|h| json!({ "Hash": h.to_string() }))
        .collect();
    session
        .request("author_removeExtrinsic", vec![Value::Array(items)])
        .await
}

/// Insert a key into the node's keystore.
pub async fn insert_key(session: &Session, key_type: &str, suri: &str, public: &str) -> Result<Value, SessionError> {
    session
        .call("author_insertKey", vec![json!(key_type), json!(suri), json!(public)])
        .await
}

/// Generate new session keys; returns their SCALE-encoded public parts.
pub async fn rotate_keys(session: &Session) -> Result<String, SessionError> {
    session.request("author_rotateKeys", vec![]).await
}

pub async fn has_session_keys(session: &Session, session_keys: &str) -> Result<bool, SessionError> {
    session
        .request("author_hasSessionKeys", vec![json!(session_keys)])
        .await
}

pub async fn has_key(session: &Session, public: &str, key_type: &str) -> Result<bool, SessionError> {
    session
        .request("author_hasKey", vec![json!(public), json!(key_type)])
        .await
}
