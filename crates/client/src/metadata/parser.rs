// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{
    CallMetadata, ConstantMetadata, Metadata, MetadataError, MetadataParser, PalletMetadata,
    SignedExtensionMetadata, SigningMetadata,
};
use crate::storage::{StorageHasher, StorageItem, StorageKind};
use crate::types::{Field, Primitive, TypeDescriptor, TypeId, TypeRegistry, Variant};
use frame_metadata::{META_RESERVED, RuntimeMetadata, RuntimeMetadataPrefixed};
use parity_scale_codec::Decode;
use scale_info::form::PortableForm;
use scale_info::{PortableRegistry, Type, TypeDef, TypeDefPrimitive};

/// Bound on chains of single-field wrapper types collapsed into their inner type.
const MAX_WRAPPER_DEPTH: usize = 32;

// V14 and V15 share field names for everything read here, but not types.
macro_rules! convert_metadata {
    ($m:ident, $version:ident) => {{
        let types = &$m.types;
        let registry = convert_registry(types)?;

        let mut pallets = Vec::with_capacity($m.pallets.len());
        for pallet in &$m.pallets {
            let storage = match &pallet.storage {
                Some(storage) => storage
                    .entries
                    .iter()
                    .map(|entry| StorageItem {
                        name: entry.name.clone(),
                        kind: match &entry.ty {
                            frame_metadata::$version::StorageEntryType::Plain(ty) => {
                                StorageKind::Plain { ty: ty.id }
                            }
                            frame_metadata::$version::StorageEntryType::Map {
                                hashers,
                                key,
                                value,
                            } => StorageKind::Map {
                                hashers: hashers.iter().map(storage_hasher).collect(),
                                key: key.id,
                                value: value.id,
                            },
                        },
                        docs: entry.docs.clone(),
                    })
                    .collect(),
                None => Vec::new(),
            };

            let calls = match &pallet.calls {
                Some(calls) => variants_of(types, calls.ty.id)?
                    .into_iter()
                    .map(|v| CallMetadata {
                        index: v.index,
                        name: v.name.clone(),
                        fields: convert_fields(&v.fields),
                        docs: v.docs.clone(),
                    })
                    .collect(),
                None => Vec::new(),
            };

            pallets.push(PalletMetadata {
                index: pallet.index,
                name: pallet.name.clone(),
                calls,
                events: match &pallet.event {
                    Some(event) => convert_variants(variants_of(types, event.ty.id)?),
                    None => Vec::new(),
                },
                errors: match &pallet.error {
                    Some(error) => convert_variants(variants_of(types, error.ty.id)?),
                    None => Vec::new(),
                },
                storage,
                constants: pallet
                    .constants
                    .iter()
                    .map(|c| ConstantMetadata {
                        name: c.name.clone(),
                        ty: c.ty.id,
                        value: c.value.clone(),
                        docs: c.docs.clone(),
                    })
                    .collect(),
            });
        }

        let extensions = $m
            .extrinsic
            .signed_extensions
            .iter()
            .map(|ext| SignedExtensionMetadata {
                name: ext.identifier.clone(),
                ty: ext.ty.id,
                additional: ext.additional_signed.id,
            })
            .collect();

        Ok(Metadata {
            registry,
            pallets,
            signing: SigningMetadata { extensions },
        })
    }};
}

/// Parser for V14 and V15 FRAME metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameMetadataParser;

impl MetadataParser for FrameMetadataParser {
    fn parse(&self, bytes: &[u8]) -> Result<Metadata, MetadataError> {
        let RuntimeMetadataPrefixed(magic, metadata) =
            RuntimeMetadataPrefixed::decode(&mut &bytes[..])?;
        if magic != META_RESERVED {
            return Err(MetadataError::InvalidMagic(magic));
        }

        match metadata {
            RuntimeMetadata::V14(m) => convert_metadata!(m, v14),
            RuntimeMetadata::V15(m) => convert_metadata!(m, v15),
            other => Err(MetadataError::UnsupportedVersion(other.version())),
        }
    }
}

// v15 reuses the v14 hasher enum
fn storage_hasher(hasher: &frame_metadata::v14::StorageHasher) -> StorageHasher {
    use frame_metadata::v14::StorageHasher as Frame;
    match hasher {
        Frame::Blake2_128 => StorageHasher::Blake2_128,
        Frame::Blake2_256 => StorageHasher::Blake2_256,
        Frame::Blake2_128Concat => StorageHasher::Blake2_128Concat,
        Frame::Twox128 => StorageHasher::Twox128,
        Frame::Twox256 => StorageHasher::Twox256,
        Frame::Twox64Concat => StorageHasher::Twox64Concat,
        Frame::Identity => StorageHasher::Identity,
    }
}

fn convert_registry(types: &PortableRegistry) -> Result<TypeRegistry, MetadataError> {
    let mut registry = TypeRegistry::new();
    for ty in &types.types {
        registry.insert(ty.id, convert_type(types, ty.id, 0)?);
    }
    Ok(registry)
}

fn convert_type(
    types: &PortableRegistry,
    id: TypeId,
    depth: usize,
) -> Result<TypeDescriptor, MetadataError> {
    let ty = types.resolve(id).ok_or(MetadataError::MissingType(id))?;

    let descriptor = match &ty.type_def {
        TypeDef::Primitive(primitive) => convert_primitive(primitive),
        TypeDef::Compact(compact) => TypeDescriptor::Compact(compact.type_param.id),
        TypeDef::Sequence(seq) => TypeDescriptor::List {
            element: seq.type_param.id,
            length: None,
        },
        TypeDef::Array(array) => TypeDescriptor::List {
            element: array.type_param.id,
            length: Some(array.len),
        },
        TypeDef::Tuple(tuple) => TypeDescriptor::Tuple(tuple.fields.iter().map(|f| f.id).collect()),
        TypeDef::BitSequence(_) => TypeDescriptor::Unsupported("BitSequence".to_string()),
        TypeDef::Variant(variant) => convert_variant_type(ty, &variant.variants),
        TypeDef::Composite(composite) => match composite.fields.as_slice() {
            // Newtype wrappers are transparent on the wire
            [single] if depth < MAX_WRAPPER_DEPTH => {
                return convert_type(types, single.ty.id, depth + 1);
            }
            [_] => TypeDescriptor::Unsupported(format!("recursive wrapper {}", id)),
            fields if !fields.is_empty() && fields.iter().all(|f| f.name.is_some()) => {
                TypeDescriptor::Struct(convert_fields(fields))
            }
            fields => TypeDescriptor::Tuple(fields.iter().map(|f| f.ty.id).collect()),
        },
    };

    Ok(descriptor)
}

fn convert_primitive(primitive: &TypeDefPrimitive) -> TypeDescriptor {
    let primitive = match primitive {
        TypeDefPrimitive::Bool => return TypeDescriptor::Boolean,
        TypeDefPrimitive::Str => return TypeDescriptor::Str,
        TypeDefPrimitive::Char => return TypeDescriptor::Unsupported("char".to_string()),
        TypeDefPrimitive::U8 => Primitive::U8,
        TypeDefPrimitive::U16 => Primitive::U16,
        TypeDefPrimitive::U32 => Primitive::U32,
        TypeDefPrimitive::U64 => Primitive::U64,
        TypeDefPrimitive::U128 => Primitive::U128,
        TypeDefPrimitive::U256 => Primitive::U256,
        TypeDefPrimitive::I8 => Primitive::I8,
        TypeDefPrimitive::I16 => Primitive::I16,
        TypeDefPrimitive::I32 => Primitive::I32,
        TypeDefPrimitive::I64 => Primitive::I64,
        TypeDefPrimitive::I128 => Primitive::I128,
        TypeDefPrimitive::I256 => Primitive::I256,
    };
    TypeDescriptor::Primitive(primitive)
}

fn convert_variant_type(
    ty: &Type<PortableForm>,
    variants: &[scale_info::Variant<PortableForm>],
) -> TypeDescriptor {
    if let [first, second] = variants
        && let ([ok], [err]) = (first.fields.as_slice(), second.fields.as_slice())
        && first.name == "Ok"
        && second.name == "Err"
    {
        return TypeDescriptor::Result {
            ok: ok.ty.id,
            err: err.ty.id,
        };
    }

    if let [first, second] = variants
        && first.name == "None"
        && first.fields.is_empty()
        && second.name == "Some"
        && let [inner] = second.fields.as_slice()
    {
        return TypeDescriptor::Option(inner.ty.id);
    }

    TypeDescriptor::Enum {
        name: ty
            .path
            .segments
            .last()
            .cloned()
            .unwrap_or_else(|| "Enum".to_string()),
        variants: convert_variants(variants.iter().collect()),
    }
}

fn convert_fields(fields: &[scale_info::Field<PortableForm>]) -> Vec<Field> {
    fields
        .iter()
        .map(|f| Field {
            name: f.name.clone(),
            ty: f.ty.id,
        })
        .collect()
}

fn convert_variants(variants: Vec<&scale_info::Variant<PortableForm>>) -> Vec<Variant> {
    variants
        .into_iter()
        .map(|v| Variant::new(v.index, v.name.clone(), convert_fields(&v.fields)))
        .collect()
}

fn variants_of(
    types: &PortableRegistry,
    id: TypeId,
) -> Result<Vec<&scale_info::Variant<PortableForm>>, MetadataError> {
    let ty = types.resolve(id).ok_or(MetadataError::MissingType(id))?;
    match &ty.type_def {
        TypeDef::Variant(variant) => Ok(variant.variants.iter().collect()),
        _ => Ok(Vec::new()),
    }
}
