// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! High-level operations over one [`RpcSession`]: storage queries and
//! extrinsic submission.

use crate::cache::{CacheError, FileStore, KeyValueStore, MemoryStore, MetadataCache};
use crate::codec::{self, CodecError};
use crate::consts::methods::{
    AUTHOR_SUBMIT_AND_WATCH_EXTRINSIC, CHAIN_GET_BLOCK_HASH, STATE_GET_STORAGE,
    SYSTEM_ACCOUNT_NEXT_INDEX,
};
use crate::crypto::{Account, Hasher, Signer, SubstrateHasher};
use crate::extrinsic::{self, Extrinsic, ExtensionParams, ExtrinsicError};
use crate::metadata::{CallMetadata, FrameMetadataParser};
use crate::rpc::{
    LoadedMetadata, RpcSession, RuntimeVersion, SessionError, SubscriptionCallback,
    SubscriptionHandle, SystemInfo, TransactionStatus,
};
use crate::storage::{self, StorageItem, StorageKey, StorageKind};
use crate::types::{BlockHash, TypeId, TypeRegistry, Value};
use dots_config::DotsConfig;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to open metadata cache: {0}")]
    Cache(#[from] CacheError),
}

/// Reasons an extrinsic was not submitted.
///
/// Serializes as `{"error": {"message": "..."}}`.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Cannot submit extrinsic (unsupported signed extensions)")]
    SigningUnsupported,

    #[error("Cannot submit extrinsic ({0})")]
    Extrinsic(#[from] ExtrinsicError),

    #[error("Failed to encode extrinsic: {0}")]
    Codec(#[from] CodecError),

    #[error("Submit extrinsic error: {0}")]
    Session(#[from] SessionError),
}

impl Serialize for SubmitError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("error", &json!({ "message": self.to_string() }))?;
        map.end()
    }
}

pub struct Context {
    session: RpcSession,
    hasher: Arc<dyn Hasher>,
    signer: Arc<dyn Signer>,
    system: SystemInfo,
    genesis_hash: BlockHash,
}

impl Context {
    /// Build a context over a started session: refresh system info and fetch
    /// the genesis hash.
    pub async fn new(
        session: RpcSession,
        hasher: Arc<dyn Hasher>,
        signer: Arc<dyn Signer>,
    ) -> Result<Self, SessionError> {
        let system = session.update().await?;
        let genesis_hash = fetch_genesis_hash(&session).await?;
        tracing::debug!("Genesis hash {}", genesis_hash);

        Ok(Self {
            session,
            hasher,
            signer,
            system,
            genesis_hash,
        })
    }

    /// Connect to the configured node with the default parser, hasher, cache
    /// and account.
    pub async fn connect(config: &DotsConfig) -> Result<Self, ContextError> {
        let store: Arc<dyn KeyValueStore> = if config.cache.in_memory {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(FileStore::open(&config.cache.path)?)
        };

        let account = match &config.account.secret {
            Some(secret) => Account::from_secret(secret),
            None => Account::dev(),
        };

        let session = RpcSession::connect(
            &config.substrate.url,
            Arc::new(FrameMetadataParser),
            MetadataCache::new(store),
        )
        .await?;

        Ok(Self::new(session, Arc::new(SubstrateHasher), Arc::new(account)).await?)
    }

    pub fn session(&self) -> &RpcSession {
        &self.session
    }

    pub fn system(&self) -> &SystemInfo {
        &self.system
    }

    pub async fn update(&mut self) -> Result<&SystemInfo, SessionError> {
        self.system = self.session.update().await?;
        Ok(&self.system)
    }

    pub fn genesis_hash(&self) -> BlockHash {
        self.genesis_hash
    }

    /// SS58 address of the signing account on this chain.
    pub fn address(&self) -> String {
        self.signer.address(self.system.ss58_format())
    }

    pub async fn metadata(&self) -> Result<Arc<LoadedMetadata>, SessionError> {
        self.session.metadata().await
    }

    pub async fn runtime_version(&self) -> Result<Arc<RuntimeVersion>, SessionError> {
        self.session.runtime_version().await
    }

    /// Value of a plain storage item, or `None` (with a logged diagnostic)
    /// when it is empty or cannot be fetched or decoded.
    pub async fn query_storage(&self, pallet: &str, item: &StorageItem) -> Option<Value> {
        let StorageKind::Plain { ty } = item.kind else {
            tracing::warn!("{}::{} is a map; query it with a key", pallet, item.name);
            return None;
        };

        let loaded = self.loaded_metadata().await?;
        let key = storage::plain_key(self.hasher.as_ref(), pallet, &item.name);
        self.storage_query(&key, ty, &loaded.metadata.registry).await
    }

    /// Value stored under `key` in a map storage item. Same failure
    /// behavior as [`query_storage`](Self::query_storage).
    pub async fn query_storage_map(
        &self,
        pallet: &str,
        item: &StorageItem,
        key: &Value,
    ) -> Option<Value> {
        let loaded = self.loaded_metadata().await?;
        let registry = &loaded.metadata.registry;

        let storage_key =
            match storage::map_key(self.hasher.as_ref(), pallet, item, key, registry) {
                Ok(storage_key) => storage_key,
                Err(e) => {
                    tracing::warn!("Cannot derive key for {}::{}: {}", pallet, item.name, e);
                    return None;
                }
            };

        self.storage_query(&storage_key, item.value_type(), registry)
            .await
    }

    /// Sign `call` with `params` and submit it, watching its status.
    ///
    /// Fails before touching the network when the runtime declares a signed
    /// extension this client cannot fill in, or when `params` do not encode.
    /// `on_status` receives every status update until the returned handle is
    /// unsubscribed.
    pub async fn submit_extrinsic<F>(
        &self,
        pallet_index: u8,
        call: &CallMetadata,
        params: &[Value],
        on_status: F,
    ) -> Result<SubscriptionHandle, SubmitError>
    where
        F: Fn(TransactionStatus) + Send + Sync + 'static,
    {
        let loaded = self.session.metadata().await?;
        if !loaded.signing_capable {
            tracing::warn!("{}", SubmitError::SigningUnsupported);
            return Err(SubmitError::SigningUnsupported);
        }

        let metadata = &loaded.metadata;
        let extensions = &metadata.signing.extensions;
        let encoded_call = extrinsic::encode_call(pallet_index, call, params, &metadata.registry)
            .inspect_err(|e| tracing::warn!("{}", e))?;

        let version = self.session.runtime_version().await?;
        let nonce = if extrinsic::requires_nonce(extensions) {
            Some(self.account_next_index().await?)
        } else {
            None
        };

        let data = extrinsic::build_extensions(
            extensions,
            &ExtensionParams {
                spec_version: version.spec_version,
                transaction_version: version.transaction_version,
                genesis_hash: self.genesis_hash,
                nonce,
            },
            &metadata.registry,
        )?;

        let signed = Extrinsic::sign(encoded_call, data, self.signer.as_ref(), self.hasher.as_ref());
        let extrinsic_hex = signed.to_hex()?;
        tracing::debug!("Submitting extrinsic {}", extrinsic_hex);

        let callback: SubscriptionCallback = Arc::new(move |result: JsonValue| {
            match serde_json::from_value::<TransactionStatus>(result) {
                Ok(status) => on_status(status),
                Err(e) => tracing::warn!("Unrecognized transaction status: {}", e),
            }
        });

        self.session
            .subscribe(
                AUTHOR_SUBMIT_AND_WATCH_EXTRINSIC,
                vec![JsonValue::String(extrinsic_hex)],
                callback,
            )
            .await
            .map_err(|e| {
                tracing::warn!("Submit extrinsic error: {}", e);
                SubmitError::Session(e)
            })
    }

    async fn account_next_index(&self) -> Result<u64, SessionError> {
        let address = self.address();
        let result = self
            .session
            .request_result(SYSTEM_ACCOUNT_NEXT_INDEX, vec![JsonValue::String(address)])
            .await?;

        result
            .as_u64()
            .ok_or_else(|| SessionError::UnexpectedResponse {
                method: SYSTEM_ACCOUNT_NEXT_INDEX.to_string(),
                detail: format!("nonce {}", result),
            })
    }

    async fn loaded_metadata(&self) -> Option<Arc<LoadedMetadata>> {
        self.session
            .metadata()
            .await
            .inspect_err(|e| tracing::warn!("Metadata unavailable: {}", e))
            .ok()
    }

    async fn storage_query(
        &self,
        key: &StorageKey,
        ty: TypeId,
        registry: &TypeRegistry,
    ) -> Option<Value> {
        let result = match self
            .session
            .request_result(STATE_GET_STORAGE, vec![JsonValue::String(key.to_hex())])
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Storage query {} failed: {}", key, e);
                return None;
            }
        };

        let Some(bytes) = result
            .as_str()
            .and_then(|s| s.strip_prefix("0x"))
            .and_then(|s| hex::decode(s).ok())
        else {
            tracing::warn!("No storage value at {} ({})", key, result);
            return None;
        };

        match codec::decode(&bytes, ty, registry) {
            Ok((value, _)) => Some(value),
            Err(e) => {
                tracing::warn!("Failed to decode storage value at {}: {}", key, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("session", &self.session)
            .field("system", &self.system)
            .field("genesis_hash", &self.genesis_hash)
            .finish_non_exhaustive()
    }
}

async fn fetch_genesis_hash(session: &RpcSession) -> Result<BlockHash, SessionError> {
    let result = session
        .request_result(CHAIN_GET_BLOCK_HASH, vec![json!(0)])
        .await?;

    result
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| SessionError::UnexpectedResponse {
            method: CHAIN_GET_BLOCK_HASH.to_string(),
            detail: format!("block hash {}", result),
        })
}
