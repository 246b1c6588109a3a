// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::consts::DEV_SECRET;
use dashmap::DashMap;
use sp_core::Pair as _;
use sp_core::crypto::{Ss58AddressFormat, Ss58Codec};
use sp_core::sr25519;
use std::fmt;

/// Signing capability used for extrinsic submission.
pub trait Signer: Send + Sync {
    /// Raw 32-byte public key, used as the account id.
    fn public_key(&self) -> [u8; 32];

    /// sr25519 signature over `message`.
    fn sign(&self, message: &[u8]) -> [u8; 64];

    /// SS58 address for the given network prefix.
    fn address(&self, ss58_format: u16) -> String;
}

/// An sr25519 account derived from a 32-byte secret seed.
pub struct Account {
    pair: sr25519::Pair,
    addresses: DashMap<u16, String>,
}

impl Account {
    /// Build an account from a `0x`-prefixed 32-byte hex seed.
    ///
    /// Malformed secrets are reported and replaced by the development
    /// secret, so construction never fails.
    pub fn from_secret(secret: &str) -> Self {
        match parse_secret(secret) {
            Some(seed) => Self::from_seed(&seed),
            None => {
                tracing::warn!(
                    "Invalid secret; reverting to development secret {}",
                    DEV_SECRET
                );
                Self::dev()
            }
        }
    }

    /// The well-known development account.
    pub fn dev() -> Self {
        let seed = parse_secret(DEV_SECRET).unwrap_or([0u8; 32]);
        Self::from_seed(&seed)
    }

    fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            pair: sr25519::Pair::from_seed(seed),
            addresses: DashMap::new(),
        }
    }

    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.public_key()))
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::dev()
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("public", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

impl Signer for Account {
    fn public_key(&self) -> [u8; 32] {
        let public = self.pair.public();
        let bytes: &[u8] = public.as_ref();
        let mut out = [0u8; 32];
        out.copy_from_slice(bytes);
        out
    }

    fn sign(&self, message: &[u8]) -> [u8; 64] {
        let signature = self.pair.sign(message);
        let bytes: &[u8] = signature.as_ref();
        let mut out = [0u8; 64];
        out.copy_from_slice(bytes);
        out
    }

    fn address(&self, ss58_format: u16) -> String {
        self.addresses
            .entry(ss58_format)
            .or_insert_with(|| {
                self.pair
                    .public()
                    .to_ss58check_with_version(Ss58AddressFormat::custom(ss58_format))
            })
            .clone()
    }
}

fn parse_secret(secret: &str) -> Option<[u8; 32]> {
    let hex_str = secret.strip_prefix("0x")?;
    let bytes = hex::decode(hex_str).ok()?;
    bytes.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_core::Pair;

    const ALICE_PUBLIC: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";

    #[test]
    fn test_dev_account_is_alice() {
        let account = Account::dev();
        assert_eq!(account.public_key_hex(), ALICE_PUBLIC);
        assert_eq!(
            account.address(42),
            "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"
        );
    }

    #[test]
    fn test_invalid_secret_falls_back() {
        for secret in ["", "0x1234", "not hex", &format!("0x{}", "zz".repeat(32))] {
            assert_eq!(Account::from_secret(secret).public_key_hex(), ALICE_PUBLIC);
        }
    }

    #[test]
    fn test_address_per_network() {
        let account = Account::from_secret(&format!("0x{}", "11".repeat(32)));
        let generic = account.address(42);
        let polkadot = account.address(0);
        assert_ne!(generic, polkadot);
        assert!(polkadot.starts_with('1'));
        // Cached value is returned on subsequent calls
        assert_eq!(account.address(42), generic);
    }

    #[test]
    fn test_signature_verifies() {
        let account = Account::dev();
        let message = b"dots signing payload";
        let signature = sr25519::Signature::from_raw(account.sign(message));
        let public = sr25519::Public::from_raw(account.public_key());
        assert!(sr25519::Pair::verify(&signature, message, &public));
    }
}
