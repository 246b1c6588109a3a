// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Type registry consumed by the SCALE codec.
//!
//! Descriptors are produced once per metadata load (see [`crate::metadata`])
//! and never mutated afterwards.

use serde::Serialize;
use std::collections::HashMap;

/// Identifier of a type inside a [`TypeRegistry`].
pub type TypeId = u32;

/// Fixed-width integer: bit width and signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Primitive {
    pub bits: u16,
    pub signed: bool,
}

impl Primitive {
    pub const U8: Primitive = Primitive::unsigned(8);
    pub const U16: Primitive = Primitive::unsigned(16);
    pub const U32: Primitive = Primitive::unsigned(32);
    pub const U64: Primitive = Primitive::unsigned(64);
    pub const U128: Primitive = Primitive::unsigned(128);
    pub const U256: Primitive = Primitive::unsigned(256);
    pub const I8: Primitive = Primitive::signed(8);
    pub const I16: Primitive = Primitive::signed(16);
    pub const I32: Primitive = Primitive::signed(32);
    pub const I64: Primitive = Primitive::signed(64);
    pub const I128: Primitive = Primitive::signed(128);
    pub const I256: Primitive = Primitive::signed(256);

    pub const fn unsigned(bits: u16) -> Self {
        Self {
            bits,
            signed: false,
        }
    }

    pub const fn signed(bits: u16) -> Self {
        Self { bits, signed: true }
    }

    /// Encoded size in bytes, or `None` for widths the codec cannot carry exactly.
    pub fn byte_len(&self) -> Option<usize> {
        match self.bits {
            8 | 16 | 32 | 64 | 128 => Some(usize::from(self.bits / 8)),
            _ => None,
        }
    }

    /// Short type name, e.g. `u32` or `i128`.
    pub fn name(&self) -> String {
        format!("{}{}", if self.signed { 'i' } else { 'u' }, self.bits)
    }
}

/// A field of a struct or enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: Option<String>,
    pub ty: TypeId,
}

impl Field {
    pub fn named(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn unnamed(ty: TypeId) -> Self {
        Self { name: None, ty }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub index: u8,
    pub name: String,
    pub fields: Vec<Field>,
}

impl Variant {
    pub fn new(index: u8, name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            index,
            name: name.into(),
            fields,
        }
    }
}

/// Shape of a type as far as SCALE is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    Boolean,
    /// Compact-length-prefixed UTF-8 string.
    Str,
    Compact(TypeId),
    Option(TypeId),
    Result {
        ok: TypeId,
        err: TypeId,
    },
    Tuple(Vec<TypeId>),
    List {
        element: TypeId,
        length: Option<u32>,
    },
    Struct(Vec<Field>),
    Enum {
        name: String,
        variants: Vec<Variant>,
    },
    /// A type the metadata declares but the codec does not handle (e.g. bit sequences).
    Unsupported(String),
}

impl TypeDescriptor {
    /// Human-readable tag, used in diagnostics.
    pub fn tag(&self) -> String {
        match self {
            TypeDescriptor::Primitive(p) => p.name(),
            TypeDescriptor::Boolean => "bool".to_string(),
            TypeDescriptor::Str => "str".to_string(),
            TypeDescriptor::Compact(_) => "Compact".to_string(),
            TypeDescriptor::Option(_) => "Option".to_string(),
            TypeDescriptor::Result { .. } => "Result".to_string(),
            TypeDescriptor::Tuple(_) => "Tuple".to_string(),
            TypeDescriptor::List { .. } => "List".to_string(),
            TypeDescriptor::Struct(_) => "Struct".to_string(),
            TypeDescriptor::Enum { name, .. } => name.clone(),
            TypeDescriptor::Unsupported(tag) => tag.clone(),
        }
    }
}

/// Mapping from type id to descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    types: HashMap<TypeId, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `descriptor` under `id`, returning the descriptor it replaced.
    pub fn insert(&mut self, id: TypeId, descriptor: TypeDescriptor) -> Option<TypeDescriptor> {
        self.types.insert(id, descriptor)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, id: TypeId, descriptor: TypeDescriptor) -> Self {
        self.insert(id, descriptor);
        self
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(&id)
    }

    /// Whether `id` is an unsigned 8-bit integer.
    pub fn is_byte(&self, id: TypeId) -> bool {
        matches!(self.get(id), Some(TypeDescriptor::Primitive(p)) if *p == Primitive::U8)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
