//! `system_*`: node identity, networking and account nonces.

use serde_json::{json, Value};

use substrpc_codec::AccountId32;
use substrpc_core::error::SessionError;
use substrpc_ws::Session;

use crate::types::{Health, H256};

pub async fn name(session: &Session) -> Result<String, SessionError> {
    session.request("system_name", vec![]).await
}

pub async fn version(session: &Session) -> Result<String, SessionError> {
    session.request("system_version", vec![]).await
}

pub async fn chain(session: &Session) -> Result<String, SessionError> {
    session.request("system_chain", vec![]).await
}

/// `"Development"`, `"Local"`, `"Live"` or `{"Custom": ...}`.
pub async fn chain_type(session: &Session) -> Result<Value, SessionError> {
    session.call("system_chainType", vec![]).await
}

/// Token symbol, decimals and SS58 format, as configured in the chain spec.
pub async fn properties(session: &Session) -> Result<Value, SessionError> {
    session.call("system_properties", vec![]).await
}

pub async fn health(session: &Session) -> Result<Health, SessionError> {
    session.request("system_health", vec![]).await
}

pub async fn local_peer_id(session: &Session) -> Result<String, SessionError> {
    session.request("system_localPeerId", vec![]).await
}

pub async fn local_listen_addresses(session: &Session) -> Result<Vec<String>, SessionError> {
    session.request("system_localListenAddresses", vec![]).await
}

pub async fn peers(session: &Session) -> Result<Value, SessionError> {
    session.call("system_peers", vec![]).await
}

pub async fn network_state(session: &Session) -> Result<Value, SessionError> {
    session.call("system_networkState", vec![]).await
}

/// Add a reserved peer given its multiaddress.
pub async fn add_reserved_peer(session: &Session, multiaddr: &str) -> Result<Value, SessionError> {
    session.call("system_addReservedPeer", vec![json!(multiaddr)]).await
}

pub async fn remove_reserved_peer(session: &Session, peer_id: &str) -> Result<Value, SessionError> {
    session.call("system_removeReservedPeer", vec![json!(peer_id)]).await
}

pub async fn node_roles(session: &Session) -> Result<Vec<String>, SessionError> {
    session.request("system_nodeRoles", vec![]).await
}

/// Starting, current and highest known block.
pub async fn sync_state(session: &Session) -> Result<Value, SessionError> {
    session.call("system_syncState", vec![]).await
}

/// Next usable nonce for `account`, counting transactions in the pool.
pub async fn account_next_index(session: &Session, account: &AccountId32) -> Result<u64, SessionError> {
    session
        .request("system_accountNextIndex", vec![json!(account.to_string())])
        .await
}

/// Dry-run a hex-encoded extrinsic; the result is a SCALE-encoded
/// `ApplyExtrinsicResult`.
pub async fn dry_run(session: &Session, extrinsic: &str, at: Option<H256>) -> Result<String, SessionError> {
    session
        .request("system_dryRun", vec![json!(extrinsic), super::at(at)])
        .await
}
