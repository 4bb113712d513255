//! SS58 account addresses.
//!
//! `base58(prefix ++ public_key ++ checksum[..2])`, where the checksum is
//! `blake2b_512("SS58PRE" ++ prefix ++ public_key)`.

use std::fmt;
use std::str::FromStr;

use crate::error::{DecodeError, EncodeError};
use crate::hash::blake2_512;

const CHECKSUM_PREFIX: &[u8] = b"SS58PRE";

/// Generic Substrate network prefix.
pub const GENERIC_PREFIX: u16 = 42;

/// Largest prefix the two-byte form can carry (14 bits).
pub const MAX_PREFIX: u16 = 0x3FFF;

/// A 32-byte account id (an sr25519/ed25519 public key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId32(pub [u8; 32]);

impl AccountId32 {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// SS58 address under the given network prefix. Prefixes above
    /// [`MAX_PREFIX`] have no encoding.
    pub fn to_ss58(&self, prefix: u16) -> Result<String, EncodeError> {
        if prefix > MAX_PREFIX {
            return Err(EncodeError::OutOfRange {
                value: prefix.to_string(),
                ty: "SS58 prefix".into(),
            });
        }
        Ok(self.encode_ss58(prefix))
    }

    fn encode_ss58(&self, prefix: u16) -> String {
        let mut payload = encode_prefix(prefix);
        payload.extend_from_slice(&self.0);
        let checksum = blake2_512(&[CHECKSUM_PREFIX, &payload]);
        payload.extend_from_slice(&checksum[..2]);
        bs58::encode(payload).into_string()
    }

    /// Parse an SS58 address, returning the account and its network prefix.
    pub fn from_ss58(address: &str) -> Result<(Self, u16), DecodeError> {
        let data = bs58::decode(address)
            .into_vec()
            .map_err(|e| DecodeError::InvalidAddress(format!("invalid base58: {e}")))?;
        let (prefix, prefix_len) = decode_prefix(&data)?;
        if data.len() != prefix_len + 32 + 2 {
            return Err(DecodeError::InvalidAddress(format!("unexpected length {}", data.len())));
        }
        let body = &data[..prefix_len + 32];
        let checksum = blake2_512(&[CHECKSUM_PREFIX, body]);
        if checksum[..2] != data[prefix_len + 32..] {
            return Err(DecodeError::InvalidAddress("checksum mismatch".into()));
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&body[prefix_len..]);
        Ok((Self(key), prefix))
    }
}

fn encode_prefix(prefix: u16) -> Vec<u8> {
    match prefix {
        0..=63 => vec![prefix as u8],
        _ => {
            let first = (((prefix & 0b0000_0000_1111_1100) as u8) >> 2) | 0b0100_0000;
            let second = ((prefix >> 8) as u8) | (((prefix & 0b11) as u8) << 6);
            vec![first, second]
        }
    }
}

fn decode_prefix(data: &[u8]) -> Result<(u16, usize), DecodeError> {
    let first = *data
        .first()
        .ok_or_else(|| DecodeError::InvalidAddress("empty address".into()))?;
    match first {
        0..=63 => Ok((u16::from(first), 1)),
        64..=127 => {
            let second = *data
                .get(1)
                .ok_or_else(|| DecodeError::InvalidAddress("truncated prefix".into()))?;
            let lower = ((first << 2) | (second >> 6)) as u16;
            let upper = u16::from(second & 0b0011_1111);
            Ok((lower | (upper << 8), 2))
        }
        _ => Err(DecodeError::InvalidAddress(format!("reserved prefix byte {first}"))),
    }
}

impl fmt::Display for AccountId32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode_ss58(GENERIC_PREFIX))
    }
}

impl FromStr for AccountId32 {
    type Err = DecodeError;

    /// Accepts either an SS58 address or `0x`-hex public key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") {
            return crate::hex::from_hex_array::<32>(s).map(Self);
        }
        Self::from_ss58(s).map(|(id, _)| id)
    }
}
