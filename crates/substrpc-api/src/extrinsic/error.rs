//! Errors raised while building, signing or submitting extrinsics.

use serde_json::Value;
use thiserror::Error;

use substrpc_codec::error::{DecodeError, EncodeError};
use substrpc_core::error::SessionError;

use super::submit::TransactionStatus;

/// Transaction pool error codes: 1010 invalid, 1011 unknown validity,
/// 1012 temporarily banned, 1013 already imported, 1014 priority too low,
/// 1015 cyclic dependency, 1016 immediately dropped.
pub const POOL_ERROR_CODES: std::ops::RangeInclusive<i64> = 1010..=1016;

#[derive(Debug, Error)]
pub enum ExtrinsicError {
    /// The node's pool rejected the extrinsic (stale nonce, bad signature,
    /// insufficient funds, ...). Never retried.
    #[error("Invalid transaction ({code}): {message}{}", .data.as_ref().map(|d| format!(" ({d})")).unwrap_or_default())]
    InvalidTransaction {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error(transparent)]
    Session(SessionError),

    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Decoding error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Signer error: {0}")]
    Signer(String),

    /// The extrinsic left the pool without being finalized.
    #[error("Extrinsic ended as {0:?} instead of being finalized")]
    NotFinalized(TransactionStatus),

    /// The status stream ended before the extrinsic reached the awaited state.
    #[error("Watch ended before {expected}")]
    WatchEnded { expected: &'static str },
}

impl From<SessionError> for ExtrinsicError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Rpc(e) if POOL_ERROR_CODES.contains(&e.code) => Self::InvalidTransaction {
                code: e.code,
                message: e.message,
                data: e.data,
            },
            other => Self::Session(other),
        }
    }
}

impl ExtrinsicError {
    pub fn is_invalid_transaction(&self) -> bool {
        matches!(self, Self::InvalidTransaction { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use substrpc_core::request::JsonRpcError;

    fn rpc(code: i64) -> SessionError {
        SessionError::Rpc(JsonRpcError {
            code,
            message: "Invalid Transaction".into(),
            data: Some(json!("Transaction is outdated")),
        })
    }

    #[test]
    fn pool_codes_become_invalid_transaction() {
        for code in 1010..=1016 {
            assert!(ExtrinsicError::from(rpc(code)).is_invalid_transaction());
        }
        let err = ExtrinsicError::from(rpc(1010));
        assert_eq!(
            err.to_string(),
            "Invalid transaction (1010): Invalid Transaction (\"Transaction is outdated\")"
        );
    }

    #[test]
    fn other_codes_stay_session_errors() {
        assert!(matches!(ExtrinsicError::from(rpc(-32602)), ExtrinsicError::Session(_)));
        assert!(matches!(
            ExtrinsicError::from(SessionError::disconnected()),
            ExtrinsicError::Session(SessionError::Connection(_))
        ));
    }
}
