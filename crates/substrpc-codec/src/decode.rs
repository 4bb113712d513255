//! Descriptor-driven decoding.

use crate::compact::decode_compact;
use crate::error::DecodeError;
use crate::types::{TypeDescriptor, Value};

/// A read cursor over a byte slice.
pub(crate) struct Input<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Input<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn peek(&self) -> Result<u8, DecodeError> {
        self.data.get(self.pos).copied().ok_or(DecodeError::UnexpectedEof {
            needed: 1,
            available: 0,
        })
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::UnexpectedEof { needed: n, available: self.remaining() });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn byte(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn length(&mut self) -> Result<usize, DecodeError> {
        let len = decode_compact(self)?;
        usize::try_from(len).map_err(|_| DecodeError::LengthOverflow(len))
    }
}

/// Decode exactly one value; the whole input must be consumed.
pub fn decode(bytes: &[u8], ty: &TypeDescriptor) -> Result<Value, DecodeError> {
    let (value, consumed) = decode_prefix(bytes, ty)?;
    if consumed != bytes.len() {
        return Err(DecodeError::TrailingBytes { remaining: bytes.len() - consumed });
    }
    Ok(value)
}

/// Decode one value from the front of `bytes`, returning it together with
/// the number of bytes consumed.
pub fn decode_prefix(bytes: &[u8], ty: &TypeDescriptor) -> Result<(Value, usize), DecodeError> {
    let mut input = Input::new(bytes);
    let value = decode_value(&mut input, ty)?;
    Ok((value, input.pos))
}

/// Decode a `0x`-prefixed hex blob as returned by most RPC methods.
pub fn decode_hex(hex: &str, ty: &TypeDescriptor) -> Result<Value, DecodeError> {
    let bytes = crate::hex::from_hex(hex)?;
    decode(&bytes, ty)
}

fn decode_value(input: &mut Input<'_>, ty: &TypeDescriptor) -> Result<Value, DecodeError> {
    match ty {
        TypeDescriptor::Bool => match input.byte()? {
            0 => Ok(Value::Bool(false)),
            1 => Ok(Value::Bool(true)),
            b => Err(DecodeError::InvalidBool(b)),
        },
        TypeDescriptor::U8
        | TypeDescriptor::U16
        | TypeDescriptor::U32
        | TypeDescriptor::U64
        | TypeDescriptor::U128 => {
            let width = ty.int_width().unwrap_or(16);
            let mut buf = [0u8; 16];
            buf[..width].copy_from_slice(input.take(width)?);
            Ok(Value::Uint(u128::from_le_bytes(buf)))
        }
        TypeDescriptor::I8
        | TypeDescriptor::I16
        | TypeDescriptor::I32
        | TypeDescriptor::I64
        | TypeDescriptor::I128 => {
            let width = ty.int_width().unwrap_or(16);
            let raw = input.take(width)?;
            // sign-extend into 16 bytes
            let fill = if raw[width - 1] & 0x80 != 0 { 0xff } else { 0x00 };
            let mut buf = [fill; 16];
            buf[..width].copy_from_slice(raw);
            Ok(Value::Int(i128::from_le_bytes(buf)))
        }
        TypeDescriptor::Compact => Ok(Value::Uint(decode_compact(input)?)),
        TypeDescriptor::Str => {
            let len = input.length()?;
            let raw = input.take(len)?;
            let s = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;
            Ok(Value::Str(s.to_owned()))
        }
        TypeDescriptor::Bytes => {
            let len = input.length()?;
            Ok(Value::Bytes(input.take(len)?.to_vec()))
        }
        TypeDescriptor::Fixed(n) => Ok(Value::Bytes(input.take(*n)?.to_vec())),
        TypeDescriptor::Option(inner) if **inner == TypeDescriptor::Bool => {
            // Option<bool> packs into one byte
            match input.byte()? {
                0 => Ok(Value::Option(None)),
                1 => Ok(Value::Option(Some(Box::new(Value::Bool(true))))),
                2 => Ok(Value::Option(Some(Box::new(Value::Bool(false))))),
                b => Err(DecodeError::InvalidOptionTag(b)),
            }
        }
        TypeDescriptor::Option(inner) => match input.byte()? {
            0 => Ok(Value::Option(None)),
            1 => Ok(Value::Option(Some(Box::new(decode_value(input, inner)?)))),
            b => Err(DecodeError::InvalidOptionTag(b)),
        },
        TypeDescriptor::Vec(inner) => {
            let len = input.length()?;
            decode_seq(input, inner, len)
        }
        TypeDescriptor::Array(inner, len) => decode_seq(input, inner, *len),
        TypeDescriptor::Tuple(items) => {
            let values = items
                .iter()
                .map(|t| decode_value(input, t))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Tuple(values))
        }
        TypeDescriptor::Struct(fields) => {
            let mut values = Vec::with_capacity(fields.len());
            for (name, t) in fields {
                values.push((name.clone(), decode_value(input, t)?));
            }
            Ok(Value::Struct(values))
        }
        TypeDescriptor::Enum(variants) => {
            let tag = input.byte()?;
            let variant = variants.iter().find(|v| v.index == tag).ok_or_else(|| {
                DecodeError::InvalidVariant { tag, ty: ty.to_string() }
            })?;
            let fields = variant
                .fields
                .iter()
                .map(|t| decode_value(input, t))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Variant { name: variant.name.clone(), fields })
        }
    }
}

/// Most items a sequence of zero-width elements may claim; such items
/// consume no input, so the length prefix is the only bound on the loop.
const ZERO_WIDTH_SEQ_LIMIT: usize = 1 << 16;

fn decode_seq(
    input: &mut Input<'_>,
    inner: &TypeDescriptor,
    len: usize,
) -> Result<Value, DecodeError> {
    // a hostile length prefix must drive neither the allocation nor the loop
    match inner.min_encoded_len() {
        0 if len > ZERO_WIDTH_SEQ_LIMIT => {
            return Err(DecodeError::SequenceTooLong { len, limit: ZERO_WIDTH_SEQ_LIMIT });
        }
        0 => {}
        width => {
            let needed = len.saturating_mul(width);
            if needed > input.remaining() {
                return Err(DecodeError::UnexpectedEof { needed, available: input.remaining() });
            }
        }
    }
    let mut items = Vec::with_capacity(len.min(input.remaining()));
    for _ in 0..len {
        items.push(decode_value(input, inner)?);
    }
    Ok(Value::Seq(items))
}
