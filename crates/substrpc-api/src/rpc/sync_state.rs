//! `sync_state_*`: light-client sync specs.

use serde_json::{json, Value};

use substrpc_core::error::SessionError;
use substrpc_ws::Session;

/// The chain spec extended with the current light-sync state.
pub async fn gen_sync_spec(session: &Session, raw: bool) -> Result<Value, SessionError> {
    session.call("sync_state_genSyncSpec", vec![json!(raw)]).await
}
