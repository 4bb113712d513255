//! `grandpa_*`: finality gadget state.

use serde_json::{json, Value};

use substrpc_core::error::SessionError;
use substrpc_ws::{Session, SubscriptionStream};

pub async fn round_state(session: &Session) -> Result<Value, SessionError> {
    session.call("grandpa_roundState", vec![]).await
}

/// SCALE-encoded finality proof for `block_number`.
pub async fn prove_finality(session: &Session, block_number: u64) -> Result<Option<String>, SessionError> {
    session
        .request("grandpa_proveFinality", vec![json!(block_number)])
        .await
}

/// Hex-encoded justifications as blocks are finalized.
pub async fn subscribe_justifications(session: &Session) -> Result<SubscriptionStream<String>, SessionError> {
    session
        .subscribe_stream(
            "grandpa_subscribeJustifications",
            vec![],
            "grandpa_unsubscribeJustifications",
        )
        .await
}
