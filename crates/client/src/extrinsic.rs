// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Signed extrinsic construction.
//!
//! Signed extensions are processed strictly in the order the runtime declares
//! them. Each contributes `extra` bytes (signed and transmitted) and/or
//! `additional` bytes (signed only).

use crate::codec::{self, CodecError, encode_compact_to};
use crate::consts::{
    ADDRESS_ACCOUNT_ID, MAX_SIGNING_PAYLOAD_LEN, SIGNATURE_SR25519, SIGNED_EXTRINSIC_V4,
};
use crate::crypto::{Hasher, Signer};
use crate::metadata::{CallMetadata, SignedExtensionMetadata};
use crate::types::{BlockHash, TypeRegistry, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtrinsicError {
    #[error("Unsupported signed extension: {0}")]
    UnsupportedSigningExtension(String),

    #[error("Missing account nonce")]
    MissingNonce,

    #[error("Expected {expected} params, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    #[error("Could not encode {ty} from {param}")]
    Argument {
        ty: String,
        param: String,
        #[source]
        source: CodecError,
    },

    #[error("Failed to encode {extension}: {source}")]
    Extension {
        extension: String,
        #[source]
        source: CodecError,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Signed extensions this client knows how to fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedExtensionKind {
    CheckSpecVersion,
    CheckTxVersion,
    CheckGenesis,
    CheckMortality,
    CheckNonce,
    ChargeTransactionPayment,
}

impl SignedExtensionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "CheckSpecVersion" => Self::CheckSpecVersion,
            "CheckTxVersion" => Self::CheckTxVersion,
            "CheckGenesis" => Self::CheckGenesis,
            "CheckMortality" => Self::CheckMortality,
            "CheckNonce" => Self::CheckNonce,
            "ChargeTransactionPayment" => Self::ChargeTransactionPayment,
            _ => return None,
        })
    }
}

/// Whether every declared extension is one we can fill in. Each unknown
/// extension is logged.
pub fn signing_capable(extensions: &[SignedExtensionMetadata]) -> bool {
    let mut capable = true;
    for extension in extensions {
        if SignedExtensionKind::from_name(&extension.name).is_none() {
            tracing::warn!("Unsupported signed extension: {}", extension.name);
            capable = false;
        }
    }
    capable
}

pub fn requires_nonce(extensions: &[SignedExtensionMetadata]) -> bool {
    extensions
        .iter()
        .any(|e| SignedExtensionKind::from_name(&e.name) == Some(SignedExtensionKind::CheckNonce))
}

/// Chain and account state the extensions draw from.
#[derive(Debug, Clone)]
pub struct ExtensionParams {
    pub spec_version: u32,
    pub transaction_version: u32,
    pub genesis_hash: BlockHash,
    pub nonce: Option<u64>,
}

/// Concatenated contributions of all signed extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionData {
    pub extra: Vec<u8>,
    pub additional: Vec<u8>,
}

pub fn build_extensions(
    extensions: &[SignedExtensionMetadata],
    params: &ExtensionParams,
    registry: &TypeRegistry,
) -> Result<ExtensionData, ExtrinsicError> {
    let mut data = ExtensionData::default();
    let genesis = params.genesis_hash.to_value();

    for extension in extensions {
        let kind = SignedExtensionKind::from_name(&extension.name)
            .ok_or_else(|| ExtrinsicError::UnsupportedSigningExtension(extension.name.clone()))?;

        let encode_into = |value: &Value, ty, out: &mut Vec<u8>| {
            codec::encode_to(value, ty, registry, out).map_err(|source| ExtrinsicError::Extension {
                extension: extension.name.clone(),
                source,
            })
        };

        match kind {
            SignedExtensionKind::CheckSpecVersion => encode_into(
                &Value::from(params.spec_version),
                extension.additional,
                &mut data.additional,
            )?,
            SignedExtensionKind::CheckTxVersion => encode_into(
                &Value::from(params.transaction_version),
                extension.additional,
                &mut data.additional,
            )?,
            SignedExtensionKind::CheckGenesis => {
                encode_into(&genesis, extension.additional, &mut data.additional)?
            }
            SignedExtensionKind::CheckMortality => {
                // Immortal era; the checkpoint block is then the genesis block
                let immortal = Value::variant("Era::Immortal", 0, vec![]);
                encode_into(&immortal, extension.ty, &mut data.extra)?;
                encode_into(&genesis, extension.additional, &mut data.additional)?;
            }
            SignedExtensionKind::CheckNonce => {
                let nonce = params.nonce.ok_or(ExtrinsicError::MissingNonce)?;
                encode_into(&Value::from(nonce), extension.ty, &mut data.extra)?;
            }
            SignedExtensionKind::ChargeTransactionPayment => {
                encode_into(&Value::Unsigned(0), extension.ty, &mut data.extra)?
            }
        }
    }

    Ok(data)
}

/// `[pallet index, call index, args...]`
pub fn encode_call(
    pallet_index: u8,
    call: &CallMetadata,
    params: &[Value],
    registry: &TypeRegistry,
) -> Result<Vec<u8>, ExtrinsicError> {
    if params.len() < call.fields.len() {
        return Err(ExtrinsicError::ArgumentCount {
            expected: call.fields.len(),
            got: params.len(),
        });
    }

    let mut out = vec![pallet_index, call.index];
    for (param, field) in params.iter().zip(&call.fields) {
        codec::encode_to(param, field.ty, registry, &mut out).map_err(|source| {
            ExtrinsicError::Argument {
                ty: registry
                    .get(field.ty)
                    .map(|d| d.tag())
                    .unwrap_or_else(|| field.ty.to_string()),
                param: param.to_string(),
                source,
            }
        })?;
    }
    Ok(out)
}

pub fn signing_payload(call: &[u8], data: &ExtensionData) -> Vec<u8> {
    let mut payload = Vec::with_capacity(call.len() + data.extra.len() + data.additional.len());
    payload.extend_from_slice(call);
    payload.extend_from_slice(&data.extra);
    payload.extend_from_slice(&data.additional);
    payload
}

/// Sign `payload`, or its blake2-256 hash when it exceeds 256 bytes.
pub fn sign_payload(signer: &dyn Signer, hasher: &dyn Hasher, payload: &[u8]) -> [u8; 64] {
    if payload.len() > MAX_SIGNING_PAYLOAD_LEN {
        signer.sign(&hasher.blake2_256(payload))
    } else {
        signer.sign(payload)
    }
}

/// A signed, version 4 extrinsic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extrinsic {
    pub call: Vec<u8>,
    pub extra: Vec<u8>,
    pub signer: [u8; 32],
    pub signature: [u8; 64],
}

impl Extrinsic {
    pub fn sign(call: Vec<u8>, data: ExtensionData, signer: &dyn Signer, hasher: &dyn Hasher) -> Self {
        let signature = sign_payload(signer, hasher, &signing_payload(&call, &data));
        Self {
            call,
            extra: data.extra,
            signer: signer.public_key(),
            signature,
        }
    }

    /// Length-prefixed wire encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut body = Vec::with_capacity(1 + 1 + 32 + 1 + 64 + self.extra.len() + self.call.len());
        body.push(SIGNED_EXTRINSIC_V4);
        body.push(ADDRESS_ACCOUNT_ID);
        body.extend_from_slice(&self.signer);
        body.push(SIGNATURE_SR25519);
        body.extend_from_slice(&self.signature);
        body.extend_from_slice(&self.extra);
        body.extend_from_slice(&self.call);

        let mut out = Vec::with_capacity(body.len() + 4);
        encode_compact_to(body.len() as u128, &mut out)?;
        out.extend_from_slice(&body);
        Ok(out)
    }

    pub fn to_hex(&self) -> Result<String, CodecError> {
        Ok(format!("0x{}", hex::encode(self.to_bytes()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Account, SubstrateHasher};
    use crate::types::{Field, Primitive, TypeDescriptor, Variant};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSigner {
        signed: Mutex<Vec<Vec<u8>>>,
    }

    impl Signer for RecordingSigner {
        fn public_key(&self) -> [u8; 32] {
            [0xaa; 32]
        }

        fn sign(&self, message: &[u8]) -> [u8; 64] {
            if let Ok(mut signed) = self.signed.lock() {
                signed.push(message.to_vec());
            }
            [0xbb; 64]
        }

        fn address(&self, _: u16) -> String {
            String::new()
        }
    }

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with(0, TypeDescriptor::Primitive(Primitive::U8))
            .with(1, TypeDescriptor::Primitive(Primitive::U32))
            .with(2, TypeDescriptor::List { element: 0, length: Some(32) })
            .with(3, TypeDescriptor::Compact(1))
            .with(4, TypeDescriptor::Tuple(vec![]))
            .with(
                5,
                TypeDescriptor::Enum {
                    name: "Era".to_string(),
                    variants: vec![
                        Variant::new(0, "Immortal", vec![]),
                        Variant::new(1, "Mortal1", vec![Field::unnamed(0)]),
                    ],
                },
            )
            .with(6, TypeDescriptor::Primitive(Primitive::U128))
            .with(7, TypeDescriptor::Compact(6))
            .with(8, TypeDescriptor::List { element: 0, length: None })
    }

    fn extension(name: &str, ty: u32, additional: u32) -> SignedExtensionMetadata {
        SignedExtensionMetadata {
            name: name.to_string(),
            ty,
            additional,
        }
    }

    fn params() -> ExtensionParams {
        ExtensionParams {
            spec_version: 1_017_001,
            transaction_version: 27,
            genesis_hash: BlockHash::from([0x11; 32]),
            nonce: Some(5),
        }
    }

    #[test]
    fn test_signing_capability() {
        let known = [
            extension("CheckSpecVersion", 4, 1),
            extension("CheckNonce", 3, 4),
            extension("ChargeTransactionPayment", 7, 4),
        ];
        assert!(signing_capable(&known));
        assert!(requires_nonce(&known));

        let unknown = [extension("CheckSpecVersion", 4, 1), extension("CheckMetadataHash", 4, 4)];
        assert!(!signing_capable(&unknown));
        assert!(!requires_nonce(&unknown));
        assert!(signing_capable(&[]));
    }

    #[test]
    fn test_build_extensions_in_declared_order() {
        let extensions = [
            extension("CheckTxVersion", 4, 1),
            extension("CheckSpecVersion", 4, 1),
            extension("CheckMortality", 5, 2),
            extension("CheckNonce", 3, 4),
            extension("ChargeTransactionPayment", 7, 4),
        ];

        let data = build_extensions(&extensions, &params(), &registry()).unwrap();

        // Immortal era, compact nonce 5, compact tip 0
        assert_eq!(data.extra, vec![0x00, 0x14, 0x00]);

        let mut additional = 27u32.to_le_bytes().to_vec();
        additional.extend_from_slice(&1_017_001u32.to_le_bytes());
        additional.extend_from_slice(&[0x11; 32]);
        assert_eq!(data.additional, additional);
    }

    #[test]
    fn test_build_extensions_failures() {
        let unknown = [extension("CheckWeight2", 4, 4)];
        assert_eq!(
            build_extensions(&unknown, &params(), &registry()),
            Err(ExtrinsicError::UnsupportedSigningExtension("CheckWeight2".to_string()))
        );

        let nonce = [extension("CheckNonce", 3, 4)];
        let without_nonce = ExtensionParams {
            nonce: None,
            ..params()
        };
        assert_eq!(
            build_extensions(&nonce, &without_nonce, &registry()),
            Err(ExtrinsicError::MissingNonce)
        );

        // Genesis hash cannot be encoded as a u32
        let mismatched = [extension("CheckGenesis", 4, 1)];
        assert!(matches!(
            build_extensions(&mismatched, &params(), &registry()),
            Err(ExtrinsicError::Extension { .. })
        ));
    }

    #[test]
    fn test_encode_call() {
        let call = CallMetadata {
            index: 7,
            name: "transfer".to_string(),
            fields: vec![Field::named("dest", 2), Field::named("value", 7)],
            docs: vec![],
        };
        let params = [Value::bytes(&[0x22; 32]), Value::Unsigned(64)];

        let encoded = encode_call(4, &call, &params, &registry()).unwrap();
        assert_eq!(&encoded[..2], &[4, 7]);
        assert_eq!(&encoded[2..34], &[0x22; 32]);
        assert_eq!(&encoded[34..], &[0x01, 0x01]);

        assert_eq!(
            encode_call(4, &call, &params[..1], &registry()),
            Err(ExtrinsicError::ArgumentCount { expected: 2, got: 1 })
        );
        assert!(matches!(
            encode_call(4, &call, &[Value::from("0x22"), Value::Unsigned(1)], &registry()),
            Err(ExtrinsicError::Argument { .. })
        ));
    }

    #[test]
    fn test_long_payload_is_hashed_before_signing() {
        let hasher = SubstrateHasher;
        let signer = RecordingSigner::default();

        let long = vec![0x5a; 300];
        sign_payload(&signer, &hasher, &long);
        let short = vec![0x5a; 200];
        sign_payload(&signer, &hasher, &short);
        let boundary = vec![0x5a; 256];
        sign_payload(&signer, &hasher, &boundary);

        let signed = signer.signed.lock().unwrap();
        assert_eq!(signed[0], hasher.blake2_256(&long).to_vec());
        assert_eq!(signed[1], short);
        assert_eq!(signed[2], boundary);
    }

    #[test]
    fn test_extrinsic_wire_layout() {
        let hasher = SubstrateHasher;
        let signer = RecordingSigner::default();
        let data = ExtensionData {
            extra: vec![0x00, 0x14, 0x00],
            additional: vec![0x99; 8],
        };
        let call = vec![4, 0, 1, 2, 3];

        let extrinsic = Extrinsic::sign(call.clone(), data.clone(), &signer, &hasher);
        let bytes = extrinsic.to_bytes().unwrap();

        // Additional bytes are signed but never transmitted
        let signed = signer.signed.lock().unwrap();
        assert_eq!(signed[0], signing_payload(&call, &data));

        let mut input = bytes.as_slice();
        let body_len = codec::decode_compact(&mut input).unwrap() as usize;
        assert_eq!(body_len, 1 + 1 + 32 + 1 + 64 + 3 + 5);
        let body = input;
        assert_eq!(body.len(), body_len);
        assert_eq!(body[0], 0x84);
        assert_eq!(body[1], 0x00);
        assert_eq!(&body[2..34], &[0xaa; 32]);
        assert_eq!(body[34], 0x01);
        assert_eq!(&body[35..99], &[0xbb; 64]);
        assert_eq!(&body[99..102], &[0x00, 0x14, 0x00]);
        assert_eq!(&body[102..], call.as_slice());
        assert!(extrinsic.to_hex().unwrap().starts_with("0x"));
    }

    #[test]
    fn test_extrinsic_signature_verifies() {
        use sp_core::{Pair, sr25519};

        let account = Account::dev();
        let hasher = SubstrateHasher;
        let call = vec![0u8, 1, 8, 1, 2];
        let data = ExtensionData {
            extra: vec![0x00],
            additional: vec![0x42; 4],
        };

        let extrinsic = Extrinsic::sign(call.clone(), data.clone(), &account, &hasher);
        let signature = sr25519::Signature::from_raw(extrinsic.signature);
        let public = sr25519::Public::from_raw(extrinsic.signer);
        assert!(sr25519::Pair::verify(&signature, signing_payload(&call, &data), &public));
    }
}
