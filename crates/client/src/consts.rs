// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

/// JSON-RPC methods consumed from the node
pub mod methods {
    pub const SYSTEM_NAME: &str = "system_name";
    pub const SYSTEM_VERSION: &str = "system_version";
    pub const SYSTEM_CHAIN: &str = "system_chain";
    pub const SYSTEM_PROPERTIES: &str = "system_properties";
    pub const SYSTEM_HEALTH: &str = "system_health";
    pub const SYSTEM_ACCOUNT_NEXT_INDEX: &str = "system_accountNextIndex";
    pub const STATE_SUBSCRIBE_RUNTIME_VERSION: &str = "state_subscribeRuntimeVersion";
    pub const STATE_RUNTIME_VERSION: &str = "state_runtimeVersion";
    pub const STATE_GET_METADATA: &str = "state_getMetadata";
    pub const STATE_GET_STORAGE: &str = "state_getStorage";
    pub const CHAIN_GET_BLOCK_HASH: &str = "chain_getBlockHash";
    pub const AUTHOR_SUBMIT_AND_WATCH_EXTRINSIC: &str = "author_submitAndWatchExtrinsic";
}

/// Fixed request ids for the startup system-info queries, paired with their methods.
pub const SYSTEM_QUERIES: [(&str, &str); 5] = [
    ("name", methods::SYSTEM_NAME),
    ("version", methods::SYSTEM_VERSION),
    ("chain", methods::SYSTEM_CHAIN),
    ("properties", methods::SYSTEM_PROPERTIES),
    ("health", methods::SYSTEM_HEALTH),
];

pub const METADATA_REQUEST_ID: &str = "metadata";
pub const VERSION_SUBSCRIPTION_ID: &str = "version-subscription";

pub const JSONRPC_VERSION: &str = "2.0";

/// Signing payloads longer than this are replaced by their blake2-256 hash.
pub const MAX_SIGNING_PAYLOAD_LEN: usize = 256;

/// Signed extrinsic, format version 4.
pub const SIGNED_EXTRINSIC_V4: u8 = 0x80 | 4;
/// `MultiAddress::Id`
pub const ADDRESS_ACCOUNT_ID: u8 = 0x00;
/// `MultiSignature::Sr25519`
pub const SIGNATURE_SR25519: u8 = 0x01;

/// Generic Substrate SS58 prefix, used when the chain does not declare one.
pub const DEFAULT_SS58_FORMAT: u16 = 42;

/// Development secret seed (Alice).
pub const DEV_SECRET: &str = "0xe5be9a5092b81bca64be81d212e7f2f9eba183bb7a90954f7b76361f6edb5c0a";
