// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::types::TypeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Type id {0} is not in the registry")]
    UnknownType(TypeId),

    #[error("Unsupported type '{tag}' (type id {id})")]
    UnsupportedType { id: TypeId, tag: String },

    #[error("Compact value {0} is out of range (must be below 2^30)")]
    CompactOutOfRange(u128),

    #[error("Unsupported compact encoding mode {0:#04b}")]
    UnsupportedCompactMode(u8),

    #[error("Cannot encode {found} as '{expected}' (type id {id})")]
    EncodingMismatch {
        id: TypeId,
        expected: String,
        found: String,
    },

    #[error("Invalid variant index {index} for '{name}'")]
    InvalidVariantIndex { name: String, index: u8 },

    #[error("Unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    #[error("String is not valid UTF-8")]
    InvalidUtf8,

    #[error("Type nesting exceeds {0} levels")]
    RecursionLimit(usize),
}
