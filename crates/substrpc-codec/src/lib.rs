//! # substrpc-codec
//!
//! A compact, descriptor-driven binary codec in the SCALE family, plus the
//! small helpers RPC payloads need around it: `0x` hex, blake2 hashing and
//! SS58 account addresses.
//!
//! Values are untyped ([`Value`]); the caller supplies the shape
//! ([`TypeDescriptor`]) at both ends:
//!
//! ```
//! use substrpc_codec::{decode, encode, TypeDescriptor, Value};
//!
//! let ty = TypeDescriptor::Vec(Box::new(TypeDescriptor::U16));
//! let v = Value::Seq(vec![Value::Uint(1), Value::Uint(2)]);
//! let bytes = encode(&v, &ty).unwrap();
//! assert_eq!(bytes, vec![0x08, 0x01, 0x00, 0x02, 0x00]);
//! assert_eq!(decode(&bytes, &ty).unwrap(), v);
//! ```

pub mod compact;
pub mod decode;
pub mod encode;
pub mod error;
pub mod hash;
pub mod hex;
pub mod ss58;
pub mod types;

pub use decode::{decode, decode_hex, decode_prefix};
pub use encode::{encode, encode_to};
pub use error::{DecodeError, EncodeError};
pub use hash::blake2_256;
pub use ss58::AccountId32;
pub use types::{TypeDescriptor, Value, VariantDef};
