// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Hashing and signing capabilities consumed by storage key derivation and
//! extrinsic construction.

mod account;
mod hash;

pub use account::{Account, Signer};
pub use hash::{Hasher, SubstrateHasher};
