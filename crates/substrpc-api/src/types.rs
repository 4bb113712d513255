//! Response types for the RPC calls that have a fixed shape.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use substrpc_codec::error::DecodeError;
use substrpc_codec::hex::{from_hex_array, to_hex};

/// A 32-byte hash (block, extrinsic or storage hash), `0x`-hex on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct H256(pub [u8; 32]);

impl H256 {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<H256> for Value {
    fn from(h: H256) -> Self {
        Value::String(h.to_string())
    }
}

impl FromStr for H256 {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        from_hex_array::<32>(s).map(Self)
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({self})")
    }
}

impl Serialize for H256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for H256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Block numbers arrive as `0x`-hex strings in headers but as plain
/// numbers elsewhere; accept both.
pub(crate) mod hex_number {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(u64),
        Str(String),
    }

    pub fn serialize<S: Serializer>(n: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{n:x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Num(n) => Ok(n),
            Repr::Str(s) => {
                let digits = s.strip_prefix("0x").unwrap_or(&s);
                u64::from_str_radix(digits, 16).map_err(serde::de::Error::custom)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Digest {
    #[serde(default)]
    pub logs: Vec<String>,
}

/// A block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub parent_hash: H256,
    #[serde(with = "hex_number")]
    pub number: u64,
    pub state_root: H256,
    pub extrinsics_root: H256,
    #[serde(default)]
    pub digest: Digest,
}

/// A block body with its header; extrinsics stay hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub extrinsics: Vec<String>,
}

/// `chain_getBlock` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBlock {
    pub block: Block,
    #[serde(default)]
    pub justifications: Option<Value>,
}

/// `state_getRuntimeVersion` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeVersion {
    pub spec_name: String,
    pub impl_name: String,
    #[serde(default)]
    pub authoring_version: u32,
    pub spec_version: u32,
    #[serde(default)]
    pub impl_version: u32,
    #[serde(default)]
    pub apis: Vec<(String, u32)>,
    #[serde(default)]
    pub transaction_version: u32,
    #[serde(default)]
    pub state_version: Option<u8>,
}

/// `system_health` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub peers: u64,
    pub is_syncing: bool,
    pub should_have_peers: bool,
}

/// One `state_subscribeStorage` / `state_queryStorage` change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageChangeSet {
    pub block: H256,
    pub changes: Vec<(String, Option<String>)>,
}

/// Offchain storage area for `offchain_localStorage*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StorageKind {
    Persistent,
    Local,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ZERO: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn header_from_node_json() {
        let raw = json!({
            "parentHash": "0xdcdd89927d8a348e00257e1ecc8617f45edb5118efff3ea2f9961b2ad9b7690a",
            "number": "0x1b",
            "stateRoot": ZERO,
            "extrinsicsRoot": ZERO,
            "digest": { "logs": ["0x0642414245"] }
        });
        let header: Header = serde_json::from_value(raw).unwrap();
        assert_eq!(header.number, 27);
        assert_eq!(header.digest.logs.len(), 1);
        assert_eq!(serde_json::to_value(&header).unwrap()["number"], "0x1b");
    }

    #[test]
    fn runtime_version_defaults() {
        let rv: RuntimeVersion = serde_json::from_value(json!({
            "specName": "node",
            "implName": "substrate-node",
            "specVersion": 264,
            "apis": [["0xdf6acb689907609b", 3]]
        }))
        .unwrap();
        assert_eq!(rv.spec_version, 264);
        assert_eq!(rv.transaction_version, 0);
        assert_eq!(rv.apis[0].1, 3);
    }

    #[test]
    fn storage_kind_wire_names() {
        assert_eq!(serde_json::to_value(StorageKind::Persistent).unwrap(), "PERSISTENT");
        assert_eq!(serde_json::to_value(StorageKind::Local).unwrap(), "LOCAL");
    }

    #[test]
    fn h256_rejects_short_hex() {
        assert!("0xbeef".parse::<H256>().is_err());
        assert_eq!(ZERO.parse::<H256>().unwrap(), H256::default());
    }
}
