//! Compact unsigned integers.
//!
//! The two low bits of the first byte select the mode:
//!
//! ```text
//! 0b00  single byte      value < 2^6
//! 0b01  two bytes LE     value < 2^14
//! 0b10  four bytes LE    value < 2^30
//! 0b11  big integer      upper six bits = byte count - 4, then LE bytes
//! ```

use crate::decode::Input;
use crate::error::DecodeError;

const SINGLE_MAX: u128 = (1 << 6) - 1;
const TWO_MAX: u128 = (1 << 14) - 1;
const FOUR_MAX: u128 = (1 << 30) - 1;

/// Append the compact encoding of `value` to `out`.
pub fn encode_compact(value: u128, out: &mut Vec<u8>) {
    match value {
        0..=SINGLE_MAX => out.push((value as u8) << 2),
        0..=TWO_MAX => out.extend_from_slice(&(((value as u16) << 2) | 0b01).to_le_bytes()),
        0..=FOUR_MAX => out.extend_from_slice(&(((value as u32) << 2) | 0b10).to_le_bytes()),
        _ => {
            let bytes = value.to_le_bytes();
            let len = 16 - (value.leading_zeros() as usize / 8);
            out.push((((len - 4) as u8) << 2) | 0b11);
            out.extend_from_slice(&bytes[..len]);
        }
    }
}

/// Compact encoding of `value` as a fresh vector.
pub fn compact_bytes(value: u128) -> Vec<u8> {
    let mut out = Vec::with_capacity(5);
    encode_compact(value, &mut out);
    out
}

/// Read a compact integer, rejecting encodings that use a wider mode than
/// the value needs.
pub(crate) fn decode_compact(input: &mut Input<'_>) -> Result<u128, DecodeError> {
    let first = input.peek()?;
    match first & 0b11 {
        0b00 => {
            input.take(1)?;
            Ok(u128::from(first >> 2))
        }
        0b01 => {
            let b = input.take(2)?;
            let v = u128::from(u16::from_le_bytes([b[0], b[1]]) >> 2);
            if v <= SINGLE_MAX {
                return Err(DecodeError::NonCanonicalCompact);
            }
            Ok(v)
        }
        0b10 => {
            let b = input.take(4)?;
            let v = u128::from(u32::from_le_bytes([b[0], b[1], b[2], b[3]]) >> 2);
            if v <= TWO_MAX {
                return Err(DecodeError::NonCanonicalCompact);
            }
            Ok(v)
        }
        _ => {
            input.take(1)?;
            let len = usize::from(first >> 2) + 4;
            if len > 16 {
                return Err(DecodeError::CompactOverflow);
            }
            let b = input.take(len)?;
            if b[len - 1] == 0 {
                return Err(DecodeError::NonCanonicalCompact);
            }
            let mut buf = [0u8; 16];
            buf[..len].copy_from_slice(b);
            let v = u128::from_le_bytes(buf);
            if v <= FOUR_MAX {
                return Err(DecodeError::NonCanonicalCompact);
            }
            Ok(v)
        }
    }
}
