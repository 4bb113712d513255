//! `payment_*`: fee estimation.

use serde_json::{json, Value};

use substrpc_core::error::SessionError;
use substrpc_ws::Session;

use crate::types::H256;

/// Weight, dispatch class and partial fee of a hex-encoded extrinsic.
pub async fn query_info(session: &Session, extrinsic: &str, at: Option<H256>) -> Result<Value, SessionError> {
    session
        .call("payment_queryInfo", vec![json!(extrinsic), super::at(at)])
        .await
}
