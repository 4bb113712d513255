//! `0x`-prefixed hex helpers.

use crate::error::DecodeError;

/// Encode bytes as lowercase hex with a `0x` prefix.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse hex with or without a `0x` prefix.
pub fn from_hex(s: &str) -> Result<Vec<u8>, DecodeError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| DecodeError::InvalidHex(e.to_string()))
}

/// Parse hex into a fixed-size array, e.g. a 32-byte hash.
pub fn from_hex_array<const N: usize>(s: &str) -> Result<[u8; N], DecodeError> {
    let bytes = from_hex(s)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        DecodeError::InvalidHex(format!("expected {N} bytes, got {len}"))
    })
}
