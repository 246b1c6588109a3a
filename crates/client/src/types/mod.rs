// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core data types: the type registry, dynamic values and hash wrappers.

pub mod hash;
pub mod registry;
pub mod value;

pub use hash::{BlockHash, HashParseError};
pub use registry::{Field, Primitive, TypeDescriptor, TypeId, TypeRegistry, Variant};
pub use value::{Value, VariantValue};
