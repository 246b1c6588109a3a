// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

mod account;
mod args;
mod cache;
mod error;
mod log;
mod substrate;

pub use account::AccountConfig;
pub use args::Args;
pub use cache::CacheConfig;
pub use error::ConfigError;
pub use log::LogConfig;
pub use substrate::SubstrateConfig;

use serde::Deserialize;
use std::path::Path;

const ENV_PREFIX: &str = "DOTS_";

#[derive(Debug, Clone, Default)]
pub struct DotsConfig {
    pub substrate: SubstrateConfig,
    pub log: LogConfig,
    pub cache: CacheConfig,
    pub account: AccountConfig,
}

/// Flat view of the `DOTS_*` environment, split into sections afterwards.
#[derive(Debug, Deserialize)]
struct EnvConfig {
    #[serde(default = "substrate::default_url")]
    substrate_url: String,

    #[serde(default = "log::default_level")]
    log_level: String,
    #[serde(default)]
    log_json: bool,
    #[serde(default)]
    log_strip_ansi: bool,
    #[serde(default)]
    log_write: bool,
    #[serde(default = "log::default_write_path")]
    log_write_path: String,
    #[serde(default = "log::default_write_max_file_size")]
    log_write_max_file_size: u64,
    #[serde(default = "log::default_write_max_files")]
    log_write_max_files: usize,

    #[serde(default = "cache::default_path")]
    cache_path: String,
    #[serde(default)]
    cache_in_memory: bool,

    #[serde(default)]
    account_secret: Option<String>,
}

impl From<EnvConfig> for DotsConfig {
    fn from(env: EnvConfig) -> Self {
        Self {
            substrate: SubstrateConfig {
                url: env.substrate_url,
            },
            log: LogConfig {
                level: env.log_level,
                json: env.log_json,
                strip_ansi: env.log_strip_ansi,
                write: env.log_write,
                write_path: env.log_write_path,
                write_max_file_size: env.log_write_max_file_size,
                write_max_files: env.log_write_max_files,
            },
            cache: CacheConfig {
                path: env.cache_path,
                in_memory: env.cache_in_memory,
            },
            account: AccountConfig {
                secret: env.account_secret.filter(|s| !s.is_empty()),
            },
        }
    }
}

impl DotsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = envy::prefixed(ENV_PREFIX).from_env::<EnvConfig>()?;
        Self::finish(env)
    }

    /// Load `path` into the process environment (if it exists), then read the config.
    pub fn from_env_file(path: &str) -> Result<Self, ConfigError> {
        if Path::new(path).exists() {
            dotenv::from_path(path)?;
        }
        Self::from_env()
    }

    /// Build a config from explicit `(name, value)` pairs, e.g. `("DOTS_LOG_LEVEL", "debug")`.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env = envy::prefixed(ENV_PREFIX).from_iter::<_, EnvConfig>(vars)?;
        Self::finish(env)
    }

    fn finish(env: EnvConfig) -> Result<Self, ConfigError> {
        let config = Self::from(env);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.substrate.validate()?;
        self.log.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}
