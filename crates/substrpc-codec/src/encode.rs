//! Descriptor-driven encoding.
//!
//! Encoding validates the value against the descriptor: a value that
//! encodes successfully always decodes back to itself.

use crate::compact::encode_compact;
use crate::error::EncodeError;
use crate::types::{TypeDescriptor, Value};

/// Encode `value` as `ty` into a fresh buffer.
pub fn encode(value: &Value, ty: &TypeDescriptor) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode_to(value, ty, &mut out)?;
    Ok(out)
}

/// Append the encoding of `value` as `ty` to `out`.
///
/// On error `out` may hold a partial encoding.
pub fn encode_to(value: &Value, ty: &TypeDescriptor, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match (ty, value) {
        (TypeDescriptor::Bool, Value::Bool(b)) => out.push(u8::from(*b)),
        (
            TypeDescriptor::U8
            | TypeDescriptor::U16
            | TypeDescriptor::U32
            | TypeDescriptor::U64
            | TypeDescriptor::U128,
            Value::Uint(v),
        ) => {
            let width = ty.int_width().unwrap_or(16);
            if width < 16 && *v >> (width * 8) != 0 {
                return Err(out_of_range(v, ty));
            }
            out.extend_from_slice(&v.to_le_bytes()[..width]);
        }
        (
            TypeDescriptor::I8
            | TypeDescriptor::I16
            | TypeDescriptor::I32
            | TypeDescriptor::I64
            | TypeDescriptor::I128,
            Value::Int(v),
        ) => {
            let width = ty.int_width().unwrap_or(16);
            if width < 16 {
                let bits = width * 8;
                let min = -(1i128 << (bits - 1));
                let max = (1i128 << (bits - 1)) - 1;
                if *v < min || *v > max {
                    return Err(out_of_range(v, ty));
                }
            }
            out.extend_from_slice(&v.to_le_bytes()[..width]);
        }
        (TypeDescriptor::Compact, Value::Uint(v)) => encode_compact(*v, out),
        (TypeDescriptor::Str, Value::Str(s)) => {
            encode_compact(s.len() as u128, out);
            out.extend_from_slice(s.as_bytes());
        }
        (TypeDescriptor::Bytes, Value::Bytes(b)) => {
            encode_compact(b.len() as u128, out);
            out.extend_from_slice(b);
        }
        (TypeDescriptor::Fixed(n), Value::Bytes(b)) => {
            if b.len() != *n {
                return Err(EncodeError::LengthMismatch { expected: *n, got: b.len() });
            }
            out.extend_from_slice(b);
        }
        (TypeDescriptor::Option(inner), Value::Option(opt)) if **inner == TypeDescriptor::Bool => {
            match opt.as_deref() {
                None => out.push(0),
                Some(Value::Bool(true)) => out.push(1),
                Some(Value::Bool(false)) => out.push(2),
                Some(other) => return Err(mismatch(inner, other)),
            }
        }
        (TypeDescriptor::Option(inner), Value::Option(opt)) => match opt {
            None => out.push(0),
            Some(v) => {
                out.push(1);
                encode_to(v, inner, out)?;
            }
        },
        (TypeDescriptor::Vec(inner), Value::Seq(items)) => {
            encode_compact(items.len() as u128, out);
            for item in items {
                encode_to(item, inner, out)?;
            }
        }
        (TypeDescriptor::Array(inner, len), Value::Seq(items)) => {
            if items.len() != *len {
                return Err(EncodeError::LengthMismatch { expected: *len, got: items.len() });
            }
            for item in items {
                encode_to(item, inner, out)?;
            }
        }
        (TypeDescriptor::Tuple(types), Value::Tuple(items)) => {
            if items.len() != types.len() {
                return Err(EncodeError::LengthMismatch { expected: types.len(), got: items.len() });
            }
            for (item, t) in items.iter().zip(types) {
                encode_to(item, t, out)?;
            }
        }
        (TypeDescriptor::Struct(fields), Value::Struct(values)) => {
            if values.len() != fields.len() {
                return Err(EncodeError::LengthMismatch { expected: fields.len(), got: values.len() });
            }
            for ((name, t), (got, v)) in fields.iter().zip(values) {
                if name != got {
                    return Err(EncodeError::FieldMismatch { expected: name.clone(), got: got.clone() });
                }
                encode_to(v, t, out)?;
            }
        }
        (TypeDescriptor::Enum(variants), Value::Variant { name, fields }) => {
            let variant = variants
                .iter()
                .find(|v| &v.name == name)
                .ok_or_else(|| EncodeError::UnknownVariant(name.clone()))?;
            if fields.len() != variant.fields.len() {
                return Err(EncodeError::LengthMismatch {
                    expected: variant.fields.len(),
                    got: fields.len(),
                });
            }
            out.push(variant.index);
            for (v, t) in fields.iter().zip(&variant.fields) {
                encode_to(v, t, out)?;
            }
        }
        (ty, value) => return Err(mismatch(ty, value)),
    }
    Ok(())
}

fn mismatch(ty: &TypeDescriptor, value: &Value) -> EncodeError {
    EncodeError::TypeMismatch { expected: ty.to_string(), got: value.kind().to_string() }
}

fn out_of_range(value: &impl ToString, ty: &TypeDescriptor) -> EncodeError {
    EncodeError::OutOfRange { value: value.to_string(), ty: ty.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariantDef;

    #[test]
    fn integers_little_endian() {
        assert_eq!(encode(&Value::Uint(0x0102), &TypeDescriptor::U16).unwrap(), vec![0x02, 0x01]);
        assert_eq!(encode(&Value::Int(-1), &TypeDescriptor::I32).unwrap(), vec![0xff; 4]);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            encode(&Value::Uint(256), &TypeDescriptor::U8),
            Err(EncodeError::OutOfRange { .. })
        ));
        assert!(matches!(
            encode(&Value::Int(128), &TypeDescriptor::I8),
            Err(EncodeError::OutOfRange { .. })
        ));
        assert!(encode(&Value::Int(-128), &TypeDescriptor::I8).is_ok());
    }

    #[test]
    fn string_has_compact_prefix() {
        assert_eq!(
            encode(&Value::Str("abc".into()), &TypeDescriptor::Str).unwrap(),
            vec![0x0c, b'a', b'b', b'c']
        );
    }

    #[test]
    fn fixed_length_enforced() {
        let err = encode(&Value::Bytes(vec![0; 31]), &TypeDescriptor::hash256()).unwrap_err();
        assert_eq!(err, EncodeError::LengthMismatch { expected: 32, got: 31 });
    }

    #[test]
    fn struct_fields_must_match_in_order() {
        let ty = TypeDescriptor::Struct(vec![
            ("a".into(), TypeDescriptor::U8),
            ("b".into(), TypeDescriptor::Bool),
        ]);
        let swapped = Value::Struct(vec![
            ("b".into(), Value::Bool(true)),
            ("a".into(), Value::Uint(1)),
        ]);
        assert!(matches!(encode(&swapped, &ty), Err(EncodeError::FieldMismatch { .. })));
    }

    #[test]
    fn enum_uses_declared_index() {
        let ty = TypeDescriptor::Enum(vec![
            VariantDef::unit(0, "Id"),
            VariantDef::new(3, "Address32", vec![TypeDescriptor::Fixed(2)]),
        ]);
        let v = Value::Variant { name: "Address32".into(), fields: vec![Value::Bytes(vec![9, 9])] };
        assert_eq!(encode(&v, &ty).unwrap(), vec![3, 9, 9]);
        assert_eq!(
            encode(&Value::unit_variant("Nope"), &ty),
            Err(EncodeError::UnknownVariant("Nope".into()))
        );
    }

    #[test]
    fn kind_mismatch() {
        assert!(matches!(
            encode(&Value::Str("x".into()), &TypeDescriptor::U32),
            Err(EncodeError::TypeMismatch { .. })
        ));
    }
}
