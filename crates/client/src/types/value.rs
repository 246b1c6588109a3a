// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Dynamically typed values produced and consumed by the SCALE codec.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// A decoded (or to-be-encoded) on-chain value.
///
/// Byte lists are carried as `0x`-prefixed hex strings in [`Value::Str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `Option::None`
    Null,
    Bool(bool),
    Unsigned(u128),
    Signed(i128),
    Str(String),
    Sequence(Vec<Value>),
    /// Named fields in declaration order.
    Composite(Vec<(String, Value)>),
    Variant(VariantValue),
}

/// An enum instance. `name` is qualified as `TypeName::VariantName`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantValue {
    pub name: String,
    pub index: u8,
    pub fields: Vec<Value>,
}

impl Value {
    /// Hex-string rendering of raw bytes.
    pub fn bytes(bytes: &[u8]) -> Self {
        Value::Str(format!("0x{}", hex::encode(bytes)))
    }

    pub fn variant(name: impl Into<String>, index: u8, fields: Vec<Value>) -> Self {
        Value::Variant(VariantValue {
            name: name.into(),
            index,
            fields,
        })
    }

    pub fn composite<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Composite(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up a named field of a composite value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Composite(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Value::Unsigned(n) => Some(*n),
            Value::Signed(n) => u128::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Bytes of a hex-string value (`0x` followed by an even number of hex digits).
    pub fn as_hex_bytes(&self) -> Option<Vec<u8>> {
        let hex_str = self.as_str()?.strip_prefix("0x")?;
        hex::decode(hex_str).ok()
    }

    /// Kind name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Unsigned(_) => "unsigned integer",
            Value::Signed(_) => "signed integer",
            Value::Str(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Composite(_) => "composite",
            Value::Variant(_) => "variant",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Unsigned(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Unsigned(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Unsigned(value.into())
    }
}

impl From<u128> for Value {
    fn from(value: u128) -> Self {
        Value::Unsigned(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Signed(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

/// Best-effort conversion of JSON input, such as composite map keys given on
/// the command line.
///
/// JSON objects become composites; variants cannot be expressed this way.
impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Value::Unsigned(u.into())
                } else if let Some(i) = n.as_i64() {
                    Value::Signed(i.into())
                } else {
                    Value::Str(n.to_string())
                }
            }
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => Value::Sequence(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Composite(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            // Wider than 64 bits: decimal string
            Value::Unsigned(n) => match u64::try_from(*n) {
                Ok(small) => serializer.serialize_u64(small),
                Err(_) => serializer.collect_str(n),
            },
            Value::Signed(n) => match i64::try_from(*n) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => serializer.collect_str(n),
            },
            Value::Str(s) => serializer.serialize_str(s),
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Composite(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            // Field-less variants render as their qualified name
            Value::Variant(variant) if variant.fields.is_empty() => {
                serializer.serialize_str(&variant.name)
            }
            Value::Variant(variant) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("name", &variant.name)?;
                map.serialize_entry("fields", &variant.fields)?;
                map.end()
            }
        }
    }
}

/// Compact JSON rendering.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str(self.kind()),
        }
    }
}
