// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Registry-driven SCALE codec.
//!
//! [`decode`] and [`encode`] walk a [`TypeRegistry`] recursively, dispatching
//! on the [`TypeDescriptor`](crate::types::TypeDescriptor) of each type id.
//! Every failure is returned as a [`CodecError`]; nothing here panics on
//! malformed input.

mod compact;
mod decode;
mod encode;
mod error;

pub use compact::{COMPACT_LIMIT, decode_compact, encode_compact, encode_compact_to};
pub use decode::decode;
pub use encode::{encode, encode_to};
pub use error::CodecError;

use crate::types::{TypeDescriptor, TypeId, TypeRegistry};

/// Nesting limit for a single encode/decode call.
///
/// Registries may be cyclic; real data always bottoms out well before this.
pub const MAX_DEPTH: usize = 256;

/// Variant name wrapping `Some` of an option whose inner type is itself an
/// option, so that `Some(None)` stays distinct from `None`.
pub const OPTION_SOME: &str = "Option::Some";

/// Split `len` bytes off the front of `input`.
pub(crate) fn take<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8], CodecError> {
    let slice: &'a [u8] = *input;
    if slice.len() < len {
        return Err(CodecError::UnexpectedEnd {
            needed: len,
            remaining: slice.len(),
        });
    }

    let (head, tail) = slice.split_at(len);
    *input = tail;
    Ok(head)
}

pub(crate) fn resolve(registry: &TypeRegistry, id: TypeId) -> Result<&TypeDescriptor, CodecError> {
    registry.get(id).ok_or(CodecError::UnknownType(id))
}
