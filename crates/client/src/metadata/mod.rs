// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Runtime metadata as consumed by the codec, storage and extrinsic layers.

mod parser;

pub use parser::FrameMetadataParser;

use crate::codec::{self, CodecError};
use crate::storage::StorageItem;
use crate::types::{Field, TypeId, TypeRegistry, Value, Variant};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use thiserror::Error;

static METADATA_HEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-f]+$").ok());

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Metadata hex is not valid")]
    MalformedMetadata,

    #[error("Failed to decode metadata: {0}")]
    Decode(#[from] parity_scale_codec::Error),

    #[error("Invalid metadata magic number {0:#x}")]
    InvalidMagic(u32),

    #[error("Unsupported metadata version V{0}")]
    UnsupportedVersion(u32),

    #[error("Metadata references unknown type {0}")]
    MissingType(TypeId),

    #[error("Pallet '{0}' not found")]
    PalletNotFound(String),

    #[error("Constant '{pallet}::{name}' not found")]
    ConstantNotFound { pallet: String, name: String },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Turns a raw metadata blob into [`Metadata`].
pub trait MetadataParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<Metadata, MetadataError>;
}

/// Validate the wire/cache representation of a metadata blob and decode it
/// to bytes. Only lowercase `0x`-prefixed hex is accepted.
pub fn metadata_bytes_from_hex(hex_str: &str) -> Result<Vec<u8>, MetadataError> {
    let valid = METADATA_HEX
        .as_ref()
        .is_some_and(|re| re.is_match(hex_str));
    if !valid {
        return Err(MetadataError::MalformedMetadata);
    }

    hex::decode(&hex_str[2..]).map_err(|_| MetadataError::MalformedMetadata)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallMetadata {
    pub index: u8,
    pub name: String,
    pub fields: Vec<Field>,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantMetadata {
    pub name: String,
    pub ty: TypeId,
    pub value: Vec<u8>,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PalletMetadata {
    pub index: u8,
    pub name: String,
    pub calls: Vec<CallMetadata>,
    pub events: Vec<Variant>,
    pub errors: Vec<Variant>,
    pub storage: Vec<StorageItem>,
    pub constants: Vec<ConstantMetadata>,
}

impl PalletMetadata {
    pub fn call(&self, name: &str) -> Option<&CallMetadata> {
        self.calls.iter().find(|c| c.name == name)
    }

    pub fn storage_item(&self, name: &str) -> Option<&StorageItem> {
        self.storage.iter().find(|s| s.name == name)
    }

    pub fn constant(&self, name: &str) -> Option<&ConstantMetadata> {
        self.constants.iter().find(|c| c.name == name)
    }
}

/// A signed extension as declared by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedExtensionMetadata {
    pub name: String,
    /// Type of the bytes included in the transaction (`extra`).
    pub ty: TypeId,
    /// Type of the bytes only included in the signing payload.
    pub additional: TypeId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SigningMetadata {
    /// In declaration order.
    pub extensions: Vec<SignedExtensionMetadata>,
}

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub registry: TypeRegistry,
    pub pallets: Vec<PalletMetadata>,
    pub signing: SigningMetadata,
}

impl Metadata {
    pub fn pallet(&self, name: &str) -> Option<&PalletMetadata> {
        self.pallets.iter().find(|p| p.name == name)
    }

    pub fn pallet_by_index(&self, index: u8) -> Option<&PalletMetadata> {
        self.pallets.iter().find(|p| p.index == index)
    }

    /// Decode the value of a pallet constant.
    pub fn decode_constant(&self, pallet: &str, name: &str) -> Result<Value, MetadataError> {
        let constant = self
            .pallet(pallet)
            .ok_or_else(|| MetadataError::PalletNotFound(pallet.to_string()))?
            .constant(name)
            .ok_or_else(|| MetadataError::ConstantNotFound {
                pallet: pallet.to_string(),
                name: name.to_string(),
            })?;

        let (value, _) = codec::decode(&constant.value, constant.ty, &self.registry)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Primitive, TypeDescriptor};

    #[test]
    fn test_metadata_hex_validation() {
        assert_eq!(metadata_bytes_from_hex("0x6d657461").unwrap(), b"meta".to_vec());
        for invalid in ["", "0x", "6d657461", "0x6D657461", "0x6d65746", "0xzz", " 0x00"] {
            assert!(
                matches!(metadata_bytes_from_hex(invalid), Err(MetadataError::MalformedMetadata)),
                "{invalid:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_decode_constant() {
        let metadata = Metadata {
            registry: TypeRegistry::new().with(0, TypeDescriptor::Primitive(Primitive::U32)),
            pallets: vec![PalletMetadata {
                index: 0,
                name: "System".to_string(),
                constants: vec![ConstantMetadata {
                    name: "BlockHashCount".to_string(),
                    ty: 0,
                    value: 4096u32.to_le_bytes().to_vec(),
                    docs: vec![],
                }],
                ..Default::default()
            }],
            signing: SigningMetadata::default(),
        };

        assert_eq!(
            metadata.decode_constant("System", "BlockHashCount").unwrap(),
            Value::Unsigned(4096)
        );
        assert!(matches!(
            metadata.decode_constant("Balances", "ExistentialDeposit"),
            Err(MetadataError::PalletNotFound(_))
        ));
        assert!(matches!(
            metadata.decode_constant("System", "SS58Prefix"),
            Err(MetadataError::ConstantNotFound { .. })
        ));
    }
}
