// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Storage key derivation.
//!
//! A plain item lives at `twox128(pallet) ++ twox128(item)`. Map items append
//! the hashed, SCALE-encoded map key using the hasher the metadata declares.

use crate::codec::{self, CodecError};
use crate::crypto::Hasher;
use crate::types::{TypeId, TypeRegistry, Value};
use serde::Serialize;
use sp_core::crypto::Ss58Codec;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageKeyError {
    #[error("Unsupported storage map hasher {0}")]
    UnsupportedHasher(String),

    #[error("Storage item '{0}' is not a map")]
    NotAMap(String),

    #[error("Failed to encode storage map key: {0}")]
    Codec(#[from] CodecError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageHasher {
    Blake2_128,
    Blake2_256,
    Blake2_128Concat,
    Twox128,
    Twox256,
    Twox64Concat,
    Identity,
}

impl fmt::Display for StorageHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum StorageKind {
    Plain {
        ty: TypeId,
    },
    Map {
        hashers: Vec<StorageHasher>,
        key: TypeId,
        value: TypeId,
    },
}

/// A storage entry declared by a pallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageItem {
    pub name: String,
    pub kind: StorageKind,
    pub docs: Vec<String>,
}

impl StorageItem {
    pub fn plain(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            kind: StorageKind::Plain { ty },
            docs: Vec::new(),
        }
    }

    pub fn map(name: impl Into<String>, hasher: StorageHasher, key: TypeId, value: TypeId) -> Self {
        Self {
            name: name.into(),
            kind: StorageKind::Map {
                hashers: vec![hasher],
                key,
                value,
            },
            docs: Vec::new(),
        }
    }

    /// Type id of the stored value.
    pub fn value_type(&self) -> TypeId {
        match self.kind {
            StorageKind::Plain { ty } => ty,
            StorageKind::Map { value, .. } => value,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self.kind, StorageKind::Map { .. })
    }
}

/// Raw storage key, displayed as `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey(pub Vec<u8>);

impl StorageKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Key of a plain storage item.
pub fn plain_key(hasher: &dyn Hasher, pallet: &str, item: &str) -> StorageKey {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(&hasher.twox_128(pallet.as_bytes()));
    key.extend_from_slice(&hasher.twox_128(item.as_bytes()));
    StorageKey(key)
}

/// Key of one entry of a map storage item.
///
/// Only single-key maps hashed with `Blake2_128Concat` or `Twox64Concat` are
/// supported; anything else fails with [`StorageKeyError::UnsupportedHasher`].
pub fn map_key(
    hasher: &dyn Hasher,
    pallet: &str,
    item: &StorageItem,
    map_key: &Value,
    registry: &TypeRegistry,
) -> Result<StorageKey, StorageKeyError> {
    let StorageKind::Map { hashers, key: key_ty, .. } = &item.kind else {
        return Err(StorageKeyError::NotAMap(item.name.clone()));
    };

    let storage_hasher = match hashers.as_slice() {
        [single] => *single,
        [] => return Err(StorageKeyError::UnsupportedHasher("none".to_string())),
        many => {
            let names: Vec<String> = many.iter().map(ToString::to_string).collect();
            return Err(StorageKeyError::UnsupportedHasher(names.join(", ")));
        }
    };

    let encoded = codec::encode(map_key, *key_ty, registry)?;

    let mut key = plain_key(hasher, pallet, &item.name).0;
    match storage_hasher {
        StorageHasher::Blake2_128Concat => key.extend_from_slice(&hasher.blake2_128(&encoded)),
        StorageHasher::Twox64Concat => key.extend_from_slice(&hasher.twox_64(&encoded)),
        other => return Err(StorageKeyError::UnsupportedHasher(other.to_string())),
    }
    key.extend_from_slice(&encoded);

    Ok(StorageKey(key))
}

/// Interpret user-supplied map key text as a [`Value`].
///
/// Hex passes through as bytes and SS58 addresses become their 32-byte
/// account id. JSON arrays and objects give tuple and struct keys. Integers
/// and booleans are parsed; anything else is kept as a string.
pub fn parse_key_input(input: &str) -> Value {
    let input = input.trim();

    if (input.starts_with('[') || input.starts_with('{'))
        && let Ok(json) = serde_json::from_str::<serde_json::Value>(input)
    {
        return Value::from(&json);
    }

    if let Some(hex_str) = input.strip_prefix("0x")
        && let Ok(bytes) = hex::decode(hex_str)
    {
        return Value::bytes(&bytes);
    }

    if let Ok(account_id) = sp_core::crypto::AccountId32::from_ss58check(input) {
        let bytes: &[u8; 32] = account_id.as_ref();
        return Value::bytes(bytes);
    }

    if let Ok(n) = input.parse::<u128>() {
        return Value::Unsigned(n);
    }

    if let Ok(n) = input.parse::<i128>() {
        return Value::Signed(n);
    }

    match input {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Str(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SubstrateHasher;
    use crate::types::{Primitive, TypeDescriptor};

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with(0, TypeDescriptor::Primitive(Primitive::U8))
            .with(1, TypeDescriptor::List { element: 0, length: Some(32) })
            .with(2, TypeDescriptor::Primitive(Primitive::U32))
    }

    #[test]
    fn test_plain_key_system_events() {
        let hasher = SubstrateHasher;
        let key = plain_key(&hasher, "System", "Events");

        let mut expected = hasher.twox_128(b"System").to_vec();
        expected.extend_from_slice(&hasher.twox_128(b"Events"));
        assert_eq!(key.as_bytes(), expected.as_slice());
        assert_eq!(
            key.to_hex(),
            "0x26aa394eea5630e07c48ae0c9558cef780d41e5e16056765bc8461851072c9d7"
        );
    }

    #[test]
    fn test_map_key_blake2_128_concat() {
        let hasher = SubstrateHasher;
        let account = [0x42u8; 32];
        let item = StorageItem::map("Account", StorageHasher::Blake2_128Concat, 1, 2);

        let key = map_key(&hasher, "System", &item, &Value::bytes(&account), &registry()).unwrap();

        let mut expected = hasher.twox_128(b"System").to_vec();
        expected.extend_from_slice(&hasher.twox_128(b"Account"));
        expected.extend_from_slice(&hasher.blake2_128(&account));
        expected.extend_from_slice(&account);
        assert_eq!(key.0, expected);
        assert_eq!(key.0.len(), 32 + 16 + 32);
    }

    #[test]
    fn test_map_key_twox_64_concat() {
        let hasher = SubstrateHasher;
        let item = StorageItem::map("BlockHash", StorageHasher::Twox64Concat, 2, 1);

        let key = map_key(&hasher, "System", &item, &Value::Unsigned(0), &registry()).unwrap();

        let encoded = [0u8; 4];
        let mut expected = plain_key(&hasher, "System", "BlockHash").0;
        expected.extend_from_slice(&hasher.twox_64(&encoded));
        expected.extend_from_slice(&encoded);
        assert_eq!(key.0, expected);
    }

    #[test]
    fn test_map_key_unsupported_hashers() {
        let hasher = SubstrateHasher;
        for unsupported in [
            StorageHasher::Identity,
            StorageHasher::Blake2_256,
            StorageHasher::Twox128,
        ] {
            let item = StorageItem::map("Item", unsupported, 2, 2);
            assert_eq!(
                map_key(&hasher, "Pallet", &item, &Value::Unsigned(1), &registry()),
                Err(StorageKeyError::UnsupportedHasher(unsupported.to_string()))
            );
        }

        let double = StorageItem {
            name: "Double".to_string(),
            kind: StorageKind::Map {
                hashers: vec![StorageHasher::Twox64Concat, StorageHasher::Blake2_128Concat],
                key: 2,
                value: 2,
            },
            docs: Vec::new(),
        };
        assert!(matches!(
            map_key(&hasher, "Pallet", &double, &Value::Unsigned(1), &registry()),
            Err(StorageKeyError::UnsupportedHasher(_))
        ));
    }

    #[test]
    fn test_map_key_requires_map_and_valid_key() {
        let hasher = SubstrateHasher;
        let plain = StorageItem::plain("Number", 2);
        assert_eq!(
            map_key(&hasher, "System", &plain, &Value::Unsigned(1), &registry()),
            Err(StorageKeyError::NotAMap("Number".to_string()))
        );

        let item = StorageItem::map("Account", StorageHasher::Blake2_128Concat, 1, 2);
        assert!(matches!(
            map_key(&hasher, "System", &item, &Value::bytes(&[1, 2]), &registry()),
            Err(StorageKeyError::Codec(CodecError::EncodingMismatch { .. }))
        ));
    }

    #[test]
    fn test_parse_key_input() {
        assert_eq!(parse_key_input("0x0102"), Value::bytes(&[1, 2]));
        assert_eq!(parse_key_input("17"), Value::Unsigned(17));
        assert_eq!(parse_key_input("-3"), Value::Signed(-3));
        assert_eq!(parse_key_input("true"), Value::Bool(true));
        assert_eq!(parse_key_input("Alice"), Value::Str("Alice".to_string()));

        let alice = parse_key_input("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY");
        assert_eq!(
            alice.as_str(),
            Some("0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d")
        );

        assert_eq!(
            parse_key_input(r#"[1, "0x02"]"#),
            Value::Sequence(vec![Value::Unsigned(1), Value::Str("0x02".to_string())])
        );
        assert_eq!(
            parse_key_input(r#"{"era": 3}"#),
            Value::composite([("era", Value::Unsigned(3))])
        );
        assert_eq!(parse_key_input("[oops"), Value::Str("[oops".to_string()));
    }
}
