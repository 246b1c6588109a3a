// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Durable key-value storage for metadata blobs.

use dashmap::DashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid cache key '{0}'")]
    InvalidKey(String),

    #[error("Cache I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A string-to-string store shared across sessions.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    fn remove(&self, key: &str) -> Result<(), CacheError>;

    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

/// Process-local store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }
}

/// Store keeping one file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> Result<PathBuf, CacheError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        fs::write(self.path(key)?, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file()
                && let Some(name) = entry.file_name().to_str()
            {
                keys.push(name.to_string());
            }
        }
        Ok(keys)
    }
}

/// Metadata blobs keyed by `<implName>-<specVersion>`.
///
/// Only the newest version of each implementation is kept.
#[derive(Clone)]
pub struct MetadataCache {
    store: Arc<dyn KeyValueStore>,
}

impl MetadataCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn key(impl_name: &str, spec_version: u32) -> String {
        format!("{}-{}", impl_name, spec_version)
    }

    /// Whether `key` is `<impl_name>-<spec version>`.
    fn is_entry_of(key: &str, impl_name: &str) -> bool {
        key.rsplit_once('-')
            .is_some_and(|(name, version)| name == impl_name && version.parse::<u32>().is_ok())
    }

    /// Cached metadata hex for the given runtime, if any. Store failures are
    /// logged and reported as a miss.
    pub fn get(&self, impl_name: &str, spec_version: u32) -> Option<String> {
        let key = Self::key(impl_name, spec_version);
        match self.store.get(&key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read cached metadata {}: {}", key, e);
                None
            }
        }
    }

    /// Evict every entry for `impl_name`, then store `metadata_hex`.
    pub fn replace(
        &self,
        impl_name: &str,
        spec_version: u32,
        metadata_hex: &str,
    ) -> Result<(), CacheError> {
        for key in self.store.keys()? {
            if Self::is_entry_of(&key, impl_name) {
                tracing::debug!("Evicting cached metadata {}", key);
                self.store.remove(&key)?;
            }
        }

        self.store
            .set(&Self::key(impl_name, spec_version), metadata_hex)
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache").finish_non_exhaustive()
    }
}
