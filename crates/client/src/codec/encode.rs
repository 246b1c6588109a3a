// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{CodecError, MAX_DEPTH, OPTION_SOME, encode_compact_to, resolve};
use crate::types::{Field, Primitive, TypeDescriptor, TypeId, TypeRegistry, Value, Variant};

/// Encode `value` as type `ty`.
pub fn encode(value: &Value, ty: TypeId, registry: &TypeRegistry) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    encode_to(value, ty, registry, &mut out)?;
    Ok(out)
}

/// Append the encoding of `value` as type `ty` to `out`.
///
/// On error `out` may hold a partial encoding and should be discarded.
pub fn encode_to(
    value: &Value,
    ty: TypeId,
    registry: &TypeRegistry,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    Encoder { registry, depth: 0 }.encode_type(value, ty, out)
}

struct Encoder<'r> {
    registry: &'r TypeRegistry,
    depth: usize,
}

fn mismatch(id: TypeId, expected: impl Into<String>, found: &Value) -> CodecError {
    CodecError::EncodingMismatch {
        id,
        expected: expected.into(),
        found: found.kind().to_string(),
    }
}

impl Encoder<'_> {
    fn encode_type(&mut self, value: &Value, ty: TypeId, out: &mut Vec<u8>) -> Result<(), CodecError> {
        if self.depth >= MAX_DEPTH {
            return Err(CodecError::RecursionLimit(MAX_DEPTH));
        }

        self.depth += 1;
        let result = self.encode_descriptor(value, ty, out);
        self.depth -= 1;
        result
    }

    fn encode_descriptor(
        &mut self,
        value: &Value,
        ty: TypeId,
        out: &mut Vec<u8>,
    ) -> Result<(), CodecError> {
        let registry = self.registry;
        let descriptor = resolve(registry, ty)?;
        match (descriptor, value) {
            (TypeDescriptor::Boolean, Value::Bool(b)) => {
                out.push(u8::from(*b));
                Ok(())
            }
            (TypeDescriptor::Primitive(primitive), _) => encode_primitive(value, ty, *primitive, out),
            (TypeDescriptor::Str, Value::Str(s)) => {
                encode_compact_to(s.len() as u128, out)?;
                out.extend_from_slice(s.as_bytes());
                Ok(())
            }
            (TypeDescriptor::Compact(_), _) => {
                let n = value.as_u128().ok_or_else(|| mismatch(ty, "Compact", value))?;
                encode_compact_to(n, out)
            }
            (TypeDescriptor::Option(_), Value::Null) => {
                out.push(0);
                Ok(())
            }
            (TypeDescriptor::Option(inner), Value::Variant(variant))
                if variant.name == OPTION_SOME =>
            {
                let [field] = variant.fields.as_slice() else {
                    return Err(mismatch(ty, "Option::Some with exactly one field", value));
                };
                out.push(1);
                self.encode_type(field, *inner, out)
            }
            (TypeDescriptor::Option(inner), _) => {
                out.push(1);
                self.encode_type(value, *inner, out)
            }
            (TypeDescriptor::Result { ok, err }, Value::Variant(variant)) => {
                let inner = match variant.index {
                    0 => *ok,
                    1 => *err,
                    index => {
                        return Err(CodecError::InvalidVariantIndex {
                            name: "Result".to_string(),
                            index,
                        });
                    }
                };
                let [field] = variant.fields.as_slice() else {
                    return Err(mismatch(ty, "Result with exactly one field", value));
                };
                out.push(variant.index);
                self.encode_type(field, inner, out)
            }
            (TypeDescriptor::Tuple(fields), Value::Sequence(items)) => {
                if fields.len() != items.len() {
                    return Err(mismatch(ty, format!("tuple of {} fields", fields.len()), value));
                }
                for (item, field) in items.iter().zip(fields) {
                    self.encode_type(item, *field, out)?;
                }
                Ok(())
            }
            (TypeDescriptor::Struct(fields), _) => self.encode_struct(value, ty, fields, out),
            (TypeDescriptor::Enum { name, variants }, _) => {
                self.encode_enum(value, ty, name, variants, out)
            }
            (TypeDescriptor::List { element, length }, _) => {
                self.encode_list(value, ty, *element, *length, out)
            }
            (TypeDescriptor::Unsupported(tag), _) => Err(CodecError::UnsupportedType {
                id: ty,
                tag: tag.clone(),
            }),
            (descriptor, _) => Err(mismatch(ty, descriptor.tag(), value)),
        }
    }

    fn encode_struct(
        &mut self,
        value: &Value,
        ty: TypeId,
        fields: &[Field],
        out: &mut Vec<u8>,
    ) -> Result<(), CodecError> {
        match value {
            Value::Composite(_) => {
                for (position, field) in fields.iter().enumerate() {
                    let name = field
                        .name
                        .clone()
                        .unwrap_or_else(|| position.to_string());
                    let item = value
                        .get(&name)
                        .ok_or_else(|| mismatch(ty, format!("struct with field '{}'", name), value))?;
                    self.encode_type(item, field.ty, out)?;
                }
                Ok(())
            }
            // Positional input, as produced by UI forms
            Value::Sequence(items) if items.len() == fields.len() => {
                for (item, field) in items.iter().zip(fields) {
                    self.encode_type(item, field.ty, out)?;
                }
                Ok(())
            }
            _ => Err(mismatch(ty, format!("struct of {} fields", fields.len()), value)),
        }
    }

    fn encode_enum(
        &mut self,
        value: &Value,
        ty: TypeId,
        name: &str,
        variants: &[Variant],
        out: &mut Vec<u8>,
    ) -> Result<(), CodecError> {
        let (variant, fields): (&Variant, &[Value]) = match value {
            Value::Variant(given) => {
                let variant = variants
                    .iter()
                    .find(|v| v.index == given.index)
                    .ok_or_else(|| CodecError::InvalidVariantIndex {
                        name: name.to_string(),
                        index: given.index,
                    })?;
                (variant, given.fields.as_slice())
            }
            // Field-less variants may be given by name, qualified or not
            Value::Str(given) => {
                let short = given
                    .strip_prefix(name)
                    .and_then(|rest| rest.strip_prefix("::"))
                    .unwrap_or(given);
                let variant = variants
                    .iter()
                    .find(|v| v.name == short && v.fields.is_empty())
                    .ok_or_else(|| mismatch(ty, name, value))?;
                (variant, &[])
            }
            _ => return Err(mismatch(ty, name, value)),
        };

        if variant.fields.len() != fields.len() {
            return Err(mismatch(
                ty,
                format!("{}::{} with {} fields", name, variant.name, variant.fields.len()),
                value,
            ));
        }

        out.push(variant.index);
        for (item, field) in fields.iter().zip(&variant.fields) {
            self.encode_type(item, field.ty, out)?;
        }
        Ok(())
    }

    fn encode_list(
        &mut self,
        value: &Value,
        ty: TypeId,
        element: TypeId,
        length: Option<u32>,
        out: &mut Vec<u8>,
    ) -> Result<(), CodecError> {
        let check_length = |len: usize| -> Result<(), CodecError> {
            match length {
                Some(fixed) if fixed as usize != len => {
                    Err(mismatch(ty, format!("list of {} elements", fixed), value))
                }
                _ => Ok(()),
            }
        };

        if let Value::Str(_) = value {
            if !self.registry.is_byte(element) {
                return Err(mismatch(ty, "list", value));
            }
            let bytes = value
                .as_hex_bytes()
                .ok_or_else(|| mismatch(ty, "0x-prefixed hex bytes", value))?;
            check_length(bytes.len())?;
            if length.is_none() {
                encode_compact_to(bytes.len() as u128, out)?;
            }
            out.extend_from_slice(&bytes);
            return Ok(());
        }

        let Value::Sequence(items) = value else {
            return Err(mismatch(ty, "list", value));
        };
        check_length(items.len())?;
        if length.is_none() {
            encode_compact_to(items.len() as u128, out)?;
        }
        for item in items {
            self.encode_type(item, element, out)?;
        }
        Ok(())
    }
}

fn encode_primitive(
    value: &Value,
    ty: TypeId,
    primitive: Primitive,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    let len = primitive.byte_len().ok_or_else(|| CodecError::UnsupportedType {
        id: ty,
        tag: primitive.name(),
    })?;
    let bits = u32::from(primitive.bits);
    let out_of_range = || mismatch(ty, primitive.name(), value);

    let bytes = if primitive.signed {
        let n = match value {
            Value::Signed(n) => *n,
            Value::Unsigned(n) => i128::try_from(*n).map_err(|_| out_of_range())?,
            _ => return Err(out_of_range()),
        };
        if bits < 128 {
            let bound = 1i128 << (bits - 1);
            if n < -bound || n >= bound {
                return Err(out_of_range());
            }
        }
        n.to_le_bytes()
    } else {
        let n = value.as_u128().ok_or_else(out_of_range)?;
        if bits < 128 && n >> bits != 0 {
            return Err(out_of_range());
        }
        n.to_le_bytes()
    };

    out.extend_from_slice(&bytes[..len]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use crate::types::Field;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with(0, TypeDescriptor::Primitive(Primitive::U8))
            .with(1, TypeDescriptor::Primitive(Primitive::U16))
            .with(2, TypeDescriptor::Primitive(Primitive::U32))
            .with(3, TypeDescriptor::Primitive(Primitive::U64))
            .with(4, TypeDescriptor::Primitive(Primitive::U128))
            .with(5, TypeDescriptor::Primitive(Primitive::I8))
            .with(6, TypeDescriptor::Primitive(Primitive::I32))
            .with(7, TypeDescriptor::Primitive(Primitive::I64))
            .with(8, TypeDescriptor::Primitive(Primitive::I128))
            .with(9, TypeDescriptor::Boolean)
            .with(10, TypeDescriptor::Str)
            .with(11, TypeDescriptor::Compact(4))
            .with(12, TypeDescriptor::Option(2))
            .with(13, TypeDescriptor::Result { ok: 2, err: 10 })
            .with(14, TypeDescriptor::Tuple(vec![0, 9, 10]))
            .with(15, TypeDescriptor::List { element: 0, length: None })
            .with(16, TypeDescriptor::List { element: 0, length: Some(32) })
            .with(17, TypeDescriptor::List { element: 1, length: None })
            .with(
                18,
                TypeDescriptor::Struct(vec![
                    Field::named("free", 4),
                    Field::named("reserved", 4),
                    Field::named("flags", 9),
                ]),
            )
            .with(
                19,
                TypeDescriptor::Enum {
                    name: "MultiAddress".to_string(),
                    variants: vec![
                        Variant::new(0, "Id", vec![Field::unnamed(16)]),
                        Variant::new(1, "Index", vec![Field::unnamed(11)]),
                        Variant::new(3, "Null", vec![]),
                    ],
                },
            )
            .with(20, TypeDescriptor::Primitive(Primitive::U256))
            .with(21, TypeDescriptor::Unsupported("char".to_string()))
            .with(22, TypeDescriptor::List { element: 18, length: None })
            .with(23, TypeDescriptor::Option(12))
    }

    fn round_trip(value: Value, ty: TypeId) {
        let registry = registry();
        let encoded = encode(&value, ty, &registry).unwrap();
        let (decoded, consumed) = decode(&encoded, ty, &registry).unwrap();
        assert_eq!(decoded, value, "round trip of type {}", ty);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn test_round_trip_primitives() {
        round_trip(Value::Unsigned(0xab), 0);
        round_trip(Value::Unsigned(u16::MAX.into()), 1);
        round_trip(Value::Unsigned(0xdead_beef), 2);
        round_trip(Value::Unsigned(u64::MAX.into()), 3);
        round_trip(Value::Unsigned(u128::MAX), 4);
        round_trip(Value::Signed(-128), 5);
        round_trip(Value::Signed(i32::MIN.into()), 6);
        round_trip(Value::Signed(-1), 7);
        round_trip(Value::Signed(i128::MIN), 8);
        round_trip(Value::Bool(true), 9);
        round_trip(Value::Bool(false), 9);
        round_trip(Value::Str("Ünïcödé".to_string()), 10);
        round_trip(Value::Unsigned(16_384), 11);
    }

    #[test]
    fn test_round_trip_composites() {
        round_trip(Value::Null, 12);
        round_trip(Value::Unsigned(3), 12);
        round_trip(Value::variant("Result::Ok", 0, vec![Value::Unsigned(1)]), 13);
        round_trip(Value::variant("Result::Err", 1, vec![Value::from("bad")]), 13);
        round_trip(
            Value::Sequence(vec![Value::Unsigned(1), Value::Bool(false), Value::from("x")]),
            14,
        );
        round_trip(Value::bytes(&[1, 2, 3]), 15);
        round_trip(Value::bytes(&[7u8; 32]), 16);
        round_trip(Value::Sequence(vec![Value::Unsigned(1), Value::Unsigned(300)]), 17);
        round_trip(
            Value::composite([
                ("free", Value::Unsigned(10_000_000_000_000)),
                ("reserved", Value::Unsigned(0)),
                ("flags", Value::Bool(true)),
            ]),
            18,
        );
        round_trip(Value::variant("MultiAddress::Id", 0, vec![Value::bytes(&[9u8; 32])]), 19);
        round_trip(Value::variant("MultiAddress::Null", 3, vec![]), 19);
        round_trip(
            Value::Sequence(vec![Value::composite([
                ("free", Value::Unsigned(1)),
                ("reserved", Value::Unsigned(2)),
                ("flags", Value::Bool(false)),
            ])]),
            22,
        );
    }

    #[test]
    fn test_round_trip_nested_options() {
        let registry = registry();
        let some_none = Value::variant(OPTION_SOME, 1, vec![Value::Null]);
        let some_some = Value::variant(OPTION_SOME, 1, vec![Value::Unsigned(7)]);

        assert_eq!(encode(&Value::Null, 23, &registry).unwrap(), vec![0]);
        assert_eq!(encode(&some_none, 23, &registry).unwrap(), vec![1, 0]);
        assert_eq!(
            encode(&some_some, 23, &registry).unwrap(),
            vec![1, 1, 7, 0, 0, 0]
        );

        round_trip(Value::Null, 23);
        round_trip(some_none, 23);
        round_trip(some_some, 23);

        // A bare inner value is still accepted on encode
        assert_eq!(
            encode(&Value::Unsigned(7), 23, &registry).unwrap(),
            vec![1, 1, 7, 0, 0, 0]
        );
        assert!(matches!(
            encode(&Value::variant(OPTION_SOME, 1, vec![]), 23, &registry),
            Err(CodecError::EncodingMismatch { .. })
        ));
    }

    #[test]
    fn test_encode_layouts() {
        let registry = registry();
        assert_eq!(encode(&Value::Unsigned(1), 2, &registry).unwrap(), vec![1, 0, 0, 0]);
        assert_eq!(encode(&Value::Signed(-2), 5, &registry).unwrap(), vec![0xfe]);
        assert_eq!(encode(&Value::Null, 12, &registry).unwrap(), vec![0]);
        assert_eq!(
            encode(&Value::Unsigned(5), 12, &registry).unwrap(),
            vec![1, 5, 0, 0, 0]
        );
        assert_eq!(encode(&Value::from("0x0102"), 15, &registry).unwrap(), vec![0x08, 1, 2]);
        assert_eq!(
            encode(&Value::from("abc"), 10, &registry).unwrap(),
            vec![0x0c, b'a', b'b', b'c']
        );
    }

    #[test]
    fn test_encode_struct_ignores_input_order() {
        let registry = registry();
        let ordered = Value::composite([
            ("free", Value::Unsigned(1)),
            ("reserved", Value::Unsigned(2)),
            ("flags", Value::Bool(true)),
        ]);
        let shuffled = Value::composite([
            ("flags", Value::Bool(true)),
            ("reserved", Value::Unsigned(2)),
            ("free", Value::Unsigned(1)),
        ]);
        let positional = Value::Sequence(vec![
            Value::Unsigned(1),
            Value::Unsigned(2),
            Value::Bool(true),
        ]);

        let expected = encode(&ordered, 18, &registry).unwrap();
        assert_eq!(expected.len(), 33);
        assert_eq!(encode(&shuffled, 18, &registry).unwrap(), expected);
        assert_eq!(encode(&positional, 18, &registry).unwrap(), expected);
    }

    #[test]
    fn test_encode_enum_by_name() {
        let registry = registry();
        assert_eq!(encode(&Value::from("Null"), 19, &registry).unwrap(), vec![3]);
        assert_eq!(encode(&Value::from("MultiAddress::Null"), 19, &registry).unwrap(), vec![3]);
        // Variants with fields cannot be named without their fields
        assert!(encode(&Value::from("Index"), 19, &registry).is_err());
    }

    #[test]
    fn test_encode_mismatches() {
        let registry = registry();

        // Integer out of range
        assert!(matches!(
            encode(&Value::Unsigned(256), 0, &registry),
            Err(CodecError::EncodingMismatch { id: 0, .. })
        ));
        assert!(encode(&Value::Signed(128), 5, &registry).is_err());
        assert!(encode(&Value::Signed(-1), 2, &registry).is_err());

        // Wrong shape
        assert!(encode(&Value::from("yes"), 9, &registry).is_err());
        assert!(encode(&Value::Sequence(vec![Value::Unsigned(1)]), 14, &registry).is_err());
        assert!(encode(&Value::composite([("free", Value::Unsigned(1))]), 18, &registry).is_err());

        // Unknown variant index and field count mismatch
        assert_eq!(
            encode(&Value::variant("MultiAddress::Raw", 2, vec![]), 19, &registry),
            Err(CodecError::InvalidVariantIndex {
                name: "MultiAddress".to_string(),
                index: 2
            })
        );
        assert!(encode(&Value::variant("MultiAddress::Id", 0, vec![]), 19, &registry).is_err());

        // Fixed-length byte arrays must match exactly
        assert!(encode(&Value::bytes(&[1u8; 31]), 16, &registry).is_err());
        assert!(encode(&Value::from("0xzz"), 15, &registry).is_err());
    }

    #[test]
    fn test_encode_unsupported() {
        let registry = registry();
        assert!(matches!(
            encode(&Value::Unsigned(1), 20, &registry),
            Err(CodecError::UnsupportedType { id: 20, .. })
        ));
        assert!(matches!(
            encode(&Value::from("a"), 21, &registry),
            Err(CodecError::UnsupportedType { id: 21, .. })
        ));
        assert_eq!(
            encode(&Value::Unsigned(1 << 30), 11, &registry),
            Err(CodecError::CompactOutOfRange(1 << 30))
        );
        assert_eq!(encode(&Value::Null, 404, &registry), Err(CodecError::UnknownType(404)));
    }
}
