// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

/// Hash primitives needed for storage keys and signing payloads.
pub trait Hasher: Send + Sync {
    fn blake2_128(&self, data: &[u8]) -> [u8; 16];

    fn blake2_256(&self, data: &[u8]) -> [u8; 32];

    fn twox_64(&self, data: &[u8]) -> [u8; 8];

    fn twox_128(&self, data: &[u8]) -> [u8; 16];
}

/// [`Hasher`] backed by `sp-crypto-hashing`, matching the runtime's hashers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstrateHasher;

impl Hasher for SubstrateHasher {
    fn blake2_128(&self, data: &[u8]) -> [u8; 16] {
        sp_crypto_hashing::blake2_128(data)
    }

    fn blake2_256(&self, data: &[u8]) -> [u8; 32] {
        sp_crypto_hashing::blake2_256(data)
    }

    fn twox_64(&self, data: &[u8]) -> [u8; 8] {
        sp_crypto_hashing::twox_64(data)
    }

    fn twox_128(&self, data: &[u8]) -> [u8; 16] {
        sp_crypto_hashing::twox_128(data)
    }
}
