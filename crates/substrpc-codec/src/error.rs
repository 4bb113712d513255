//! Error types for encoding and decoding.

use thiserror::Error;

/// Errors that can occur while decoding bytes against a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unexpected end of input: needed {needed} bytes, {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    #[error("{remaining} trailing bytes after value")]
    TrailingBytes { remaining: usize },

    #[error("Variant tag {tag} out of range for {ty}")]
    InvalidVariant { tag: u8, ty: String },

    #[error("Invalid bool byte 0x{0:02x}")]
    InvalidBool(u8),

    #[error("Invalid option tag 0x{0:02x}")]
    InvalidOptionTag(u8),

    #[error("Invalid UTF-8 in string")]
    InvalidUtf8,

    #[error("Compact integer is not canonically encoded")]
    NonCanonicalCompact,

    #[error("Compact integer does not fit in 128 bits")]
    CompactOverflow,

    #[error("Length prefix {0} does not fit in usize")]
    LengthOverflow(u128),

    #[error("Sequence of {len} zero-width items exceeds the limit of {limit}")]
    SequenceTooLong { len: usize, limit: usize },

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid SS58 address: {0}")]
    InvalidAddress(String),
}

/// Errors raised when a value does not fit the descriptor it is encoded with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Value {value} out of range for {ty}")]
    OutOfRange { value: String, ty: String },

    #[error("Length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Unknown variant '{0}'")]
    UnknownVariant(String),

    #[error("Field mismatch: expected '{expected}', got '{got}'")]
    FieldMismatch { expected: String, got: String },
}
