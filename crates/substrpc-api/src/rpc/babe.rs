//! `babe_*`: BABE slot authorship.

use serde_json::Value;

use substrpc_core::error::SessionError;
use substrpc_ws::Session;

/// Slots this node's keys may author in the current epoch, keyed by
/// authority public key (`{ primary, secondary, secondary_vrf }`).
pub async fn epoch_authorship(session: &Session) -> Result<Value, SessionError> {
    session.call("babe_epochAuthorship", vec![]).await
}
