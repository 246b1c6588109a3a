// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::ConfigError;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding cached runtime metadata
    ///
    /// Env: DOTS_CACHE_PATH
    /// Default: ./.dots-cache
    pub path: String,

    /// Keep the metadata cache in memory only
    ///
    /// Env: DOTS_CACHE_IN_MEMORY
    /// Default: false
    pub in_memory: bool,
}

pub(crate) fn default_path() -> String {
    "./.dots-cache".to_string()
}

impl CacheConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.in_memory && self.path.is_empty() {
            return Err(ConfigError::ValidateError(
                "Cache path cannot be empty unless the cache is in memory".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            in_memory: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_config() {
        let config = CacheConfig::default();
        assert_eq!(config.path, "./.dots-cache");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_path_allowed_in_memory() {
        let config = CacheConfig {
            path: String::new(),
            in_memory: true,
        };
        assert!(config.validate().is_ok());

        let config = CacheConfig {
            path: String::new(),
            in_memory: false,
        };
        assert!(config.validate().is_err());
    }
}
