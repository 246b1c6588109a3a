// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{CodecError, MAX_DEPTH, OPTION_SOME, decode_compact, resolve, take};
use crate::types::{Field, Primitive, TypeDescriptor, TypeId, TypeRegistry, Value, Variant};

/// Decode one value of type `ty` from the front of `bytes`.
///
/// Returns the value together with the number of bytes consumed; trailing
/// bytes are left untouched.
pub fn decode(
    bytes: &[u8],
    ty: TypeId,
    registry: &TypeRegistry,
) -> Result<(Value, usize), CodecError> {
    let mut input = bytes;
    let mut decoder = Decoder { registry, depth: 0 };
    let value = decoder.decode_type(&mut input, ty)?;
    Ok((value, bytes.len() - input.len()))
}

struct Decoder<'r> {
    registry: &'r TypeRegistry,
    depth: usize,
}

impl Decoder<'_> {
    fn decode_type(&mut self, input: &mut &[u8], ty: TypeId) -> Result<Value, CodecError> {
        if self.depth >= MAX_DEPTH {
            return Err(CodecError::RecursionLimit(MAX_DEPTH));
        }

        self.depth += 1;
        let result = self.decode_descriptor(input, ty);
        self.depth -= 1;
        result
    }

    fn decode_descriptor(&mut self, input: &mut &[u8], ty: TypeId) -> Result<Value, CodecError> {
        let registry = self.registry;
        match resolve(registry, ty)? {
            TypeDescriptor::Boolean => match take(input, 1)?[0] {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                index => Err(CodecError::InvalidVariantIndex {
                    name: "bool".to_string(),
                    index,
                }),
            },
            TypeDescriptor::Primitive(primitive) => decode_primitive(input, ty, *primitive),
            TypeDescriptor::Str => {
                let len = decode_compact(input)? as usize;
                let raw = take(input, len)?;
                let s = std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;
                Ok(Value::Str(s.to_string()))
            }
            TypeDescriptor::Compact(_) => Ok(Value::Unsigned(decode_compact(input)?.into())),
            TypeDescriptor::Option(inner) => match take(input, 1)?[0] {
                0 => Ok(Value::Null),
                1 => {
                    let value = self.decode_type(input, *inner)?;
                    match resolve(registry, *inner)? {
                        TypeDescriptor::Option(_) => {
                            Ok(Value::variant(OPTION_SOME, 1, vec![value]))
                        }
                        _ => Ok(value),
                    }
                }
                index => Err(CodecError::InvalidVariantIndex {
                    name: "Option".to_string(),
                    index,
                }),
            },
            TypeDescriptor::Result { ok, err } => {
                // Discriminant 0 selects the first declared type (`Ok`), 1 the second (`Err`)
                let (index, name, inner) = match take(input, 1)?[0] {
                    0 => (0, "Result::Ok", *ok),
                    1 => (1, "Result::Err", *err),
                    index => {
                        return Err(CodecError::InvalidVariantIndex {
                            name: "Result".to_string(),
                            index,
                        });
                    }
                };
                let value = self.decode_type(input, inner)?;
                Ok(Value::variant(name, index, vec![value]))
            }
            TypeDescriptor::Tuple(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    values.push(self.decode_type(input, *field)?);
                }
                Ok(Value::Sequence(values))
            }
            TypeDescriptor::Struct(fields) => self.decode_struct(input, fields),
            TypeDescriptor::Enum { name, variants } => {
                let index = take(input, 1)?[0];
                let variant = variants.iter().find(|v| v.index == index).ok_or_else(|| {
                    CodecError::InvalidVariantIndex {
                        name: name.clone(),
                        index,
                    }
                })?;
                self.decode_variant(input, name, variant)
            }
            TypeDescriptor::List { element, length } => {
                let len = match length {
                    Some(fixed) => *fixed as usize,
                    None => decode_compact(input)? as usize,
                };

                if registry.is_byte(*element) {
                    return Ok(Value::bytes(take(input, len)?));
                }

                let mut values = Vec::with_capacity(len.min(input.len()));
                for _ in 0..len {
                    values.push(self.decode_type(input, *element)?);
                }
                Ok(Value::Sequence(values))
            }
            TypeDescriptor::Unsupported(tag) => Err(CodecError::UnsupportedType {
                id: ty,
                tag: tag.clone(),
            }),
        }
    }

    fn decode_struct(&mut self, input: &mut &[u8], fields: &[Field]) -> Result<Value, CodecError> {
        let mut values = Vec::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            let value = self.decode_type(input, field.ty)?;
            let name = field
                .name
                .clone()
                .unwrap_or_else(|| position.to_string());
            values.push((name, value));
        }
        Ok(Value::Composite(values))
    }

    fn decode_variant(
        &mut self,
        input: &mut &[u8],
        type_name: &str,
        variant: &Variant,
    ) -> Result<Value, CodecError> {
        let mut fields = Vec::with_capacity(variant.fields.len());
        for field in &variant.fields {
            fields.push(self.decode_type(input, field.ty)?);
        }

        Ok(Value::variant(
            format!("{}::{}", type_name, variant.name),
            variant.index,
            fields,
        ))
    }
}

fn decode_primitive(
    input: &mut &[u8],
    ty: TypeId,
    primitive: Primitive,
) -> Result<Value, CodecError> {
    let len = primitive.byte_len().ok_or_else(|| CodecError::UnsupportedType {
        id: ty,
        tag: primitive.name(),
    })?;
    let raw = take(input, len)?;

    let negative = primitive.signed && raw[len - 1] & 0x80 != 0;
    let mut buf = if negative { [0xff; 16] } else { [0u8; 16] };
    buf[..len].copy_from_slice(raw);

    if primitive.signed {
        Ok(Value::Signed(i128::from_le_bytes(buf)))
    } else {
        Ok(Value::Unsigned(u128::from_le_bytes(buf)))
    }
}
