//! Type descriptors and the untyped values they describe.

use serde::Serialize;
use std::fmt;

/// One variant of an enum descriptor.
///
/// `index` is the on-wire tag; enums may leave gaps between indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantDef {
    pub index: u8,
    pub name: String,
    pub fields: Vec<TypeDescriptor>,
}

impl VariantDef {
    pub fn new(index: u8, name: impl Into<String>, fields: Vec<TypeDescriptor>) -> Self {
        Self { index, name: name.into(), fields }
    }

    /// A variant with no payload.
    pub fn unit(index: u8, name: impl Into<String>) -> Self {
        Self::new(index, name, vec![])
    }
}

/// The shape of an encoded value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    /// Unsigned integer in compact form.
    Compact,
    /// UTF-8 string with a compact length prefix.
    Str,
    /// Byte vector with a compact length prefix.
    Bytes,
    /// Fixed-width byte array (hashes, account ids). No prefix.
    Fixed(usize),
    Option(Box<TypeDescriptor>),
    /// Variable-length sequence with a compact length prefix.
    Vec(Box<TypeDescriptor>),
    /// Fixed-length sequence. No prefix.
    Array(Box<TypeDescriptor>, usize),
    Tuple(Vec<TypeDescriptor>),
    /// Named fields, encoded in order.
    Struct(Vec<(String, TypeDescriptor)>),
    Enum(Vec<VariantDef>),
}

impl TypeDescriptor {
    /// 32-byte hash (block hash, extrinsic hash, ...).
    pub fn hash256() -> Self {
        Self::Fixed(32)
    }

    /// Byte width of fixed-size integer descriptors.
    pub(crate) fn int_width(&self) -> Option<usize> {
        match self {
            Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 => Some(4),
            Self::U64 | Self::I64 => Some(8),
            Self::U128 | Self::I128 => Some(16),
            _ => None,
        }
    }

    /// Fewest bytes any value of this type encodes to. Zero for empty
    /// tuples and structs, `Fixed(0)`, and arrays of those.
    pub(crate) fn min_encoded_len(&self) -> usize {
        match self {
            Self::Bool
            | Self::Compact
            | Self::Str
            | Self::Bytes
            | Self::Option(_)
            | Self::Vec(_)
            | Self::Enum(_) => 1,
            Self::Fixed(n) => *n,
            Self::Array(inner, n) => inner.min_encoded_len().saturating_mul(*n),
            Self::Tuple(items) => items.iter().fold(0, |acc, t| acc.saturating_add(t.min_encoded_len())),
            Self::Struct(fields) => fields
                .iter()
                .fold(0, |acc, (_, t)| acc.saturating_add(t.min_encoded_len())),
            _ => self.int_width().unwrap_or(1),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::U128 => write!(f, "u128"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::I128 => write!(f, "i128"),
            Self::Compact => write!(f, "compact"),
            Self::Str => write!(f, "str"),
            Self::Bytes => write!(f, "bytes"),
            Self::Fixed(n) => write!(f, "[u8; {n}]"),
            Self::Option(inner) => write!(f, "Option<{inner}>"),
            Self::Vec(inner) => write!(f, "Vec<{inner}>"),
            Self::Array(inner, n) => write!(f, "[{inner}; {n}]"),
            Self::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|t| t.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            Self::Struct(_) => write!(f, "struct"),
            Self::Enum(_) => write!(f, "enum"),
        }
    }
}

/// A decoded value. Integers are widened; the descriptor keeps the width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Bool(bool),
    Uint(u128),
    Int(i128),
    Str(String),
    #[serde(serialize_with = "serialize_hex")]
    Bytes(Vec<u8>),
    Option(Option<Box<Value>>),
    Seq(Vec<Value>),
    Tuple(Vec<Value>),
    Struct(Vec<(String, Value)>),
    Variant { name: String, fields: Vec<Value> },
}

fn serialize_hex<S: serde::Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&crate::hex::to_hex(bytes))
}

impl Value {
    /// Short kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Uint(_) => "uint",
            Self::Int(_) => "int",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Option(_) => "option",
            Self::Seq(_) => "seq",
            Self::Tuple(_) => "tuple",
            Self::Struct(_) => "struct",
            Self::Variant { .. } => "variant",
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Look up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// A unit enum variant.
    pub fn unit_variant(name: impl Into<String>) -> Self {
        Self::Variant { name: name.into(), fields: vec![] }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "{}", crate::hex::to_hex(b)),
            Self::Option(None) => write!(f, "None"),
            Self::Option(Some(v)) => write!(f, "Some({v})"),
            Self::Seq(items) | Self::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Struct(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Self::Variant { name, fields } if fields.is_empty() => write!(f, "{name}"),
            Self::Variant { name, fields } => {
                let parts: Vec<_> = fields.iter().map(|x| x.to_string()).collect();
                write!(f, "{name}({})", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_display() {
        assert_eq!(TypeDescriptor::Fixed(32).to_string(), "[u8; 32]");
        assert_eq!(
            TypeDescriptor::Vec(Box::new(TypeDescriptor::Option(Box::new(TypeDescriptor::U32))))
                .to_string(),
            "Vec<Option<u32>>"
        );
    }

    #[test]
    fn value_json_shape() {
        let v = Value::Struct(vec![
            ("nonce".into(), Value::Uint(7)),
            ("data".into(), Value::Bytes(vec![0xde, 0xad])),
        ]);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "struct");
        assert_eq!(json["value"][1][1]["value"], "0xdead");
        assert_eq!(v.field("nonce"), Some(&Value::Uint(7)));
    }
}
