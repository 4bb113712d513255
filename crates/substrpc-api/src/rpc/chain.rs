//! `chain_*`: headers, blocks and head subscriptions.

use serde_json::{json, Value};

use substrpc_core::error::SessionError;
use substrpc_ws::{Session, SubscriptionStream};

use crate::types::{Header, SignedBlock, H256};

/// Header of block `hash`, or of the best block. `None` if unknown.
pub async fn get_header(session: &Session, hash: Option<H256>) -> Result<Option<Header>, SessionError> {
    session.request("chain_getHeader", vec![super::at(hash)]).await
}

pub async fn get_block(session: &Session, hash: Option<H256>) -> Result<Option<SignedBlock>, SessionError> {
    session.request("chain_getBlock", vec![super::at(hash)]).await
}

/// Hash of block `number`, or of the best block. `None` if the node has no
/// such block.
pub async fn get_block_hash(session: &Session, number: Option<u64>) -> Result<Option<H256>, SessionError> {
    let param = number.map(|n| json!(n)).unwrap_or(Value::Null);
    session.request("chain_getBlockHash", vec![param]).await
}

pub async fn get_finalized_head(session: &Session) -> Result<H256, SessionError> {
    session.request("chain_getFinalizedHead", vec![]).await
}

/// New best-block headers.
pub async fn subscribe_new_heads(session: &Session) -> Result<SubscriptionStream<Header>, SessionError> {
    session
        .subscribe_stream("chain_subscribeNewHeads", vec![], "chain_unsubscribeNewHeads")
        .await
}

pub async fn subscribe_finalized_heads(session: &Session) -> Result<SubscriptionStream<Header>, SessionError> {
    session
        .subscribe_stream(
            "chain_subscribeFinalizedHeads",
            vec![],
            "chain_unsubscribeFinalizedHeads",
        )
        .await
}

/// Every imported header, including forks.
pub async fn subscribe_all_heads(session: &Session) -> Result<SubscriptionStream<Header>, SessionError> {
    session
        .subscribe_stream("chain_subscribeAllHeads", vec![], "chain_unsubscribeAllHeads")
        .await
}
