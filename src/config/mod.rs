mod basic;
mod ingest;
mod storage;

pub use basic::BasicConfig;
pub use ingest::{BatchConfig, FetchConfig};
pub use storage::{StorageBackend, StorageConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Object store settings (see `storage` table in config.toml).
    #[serde(default)]
    pub storage: StorageConfig,

    /// Remote download settings (see `fetch` table in config.toml).
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Manifest ingestion settings (see `batch` table in config.toml).
    #[serde(default)]
    pub batch: BatchConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "IMGSHELF_";

impl Config {
    /// Builds a Figment that merges defaults, an optional `config.toml` and `IMGSHELF_*`
    /// environment variables (`__` separates tables, e.g. `IMGSHELF_STORAGE__BUCKET`).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extracts and validates the layered configuration.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let cfg: Self = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.bucket must be set for the s3 backend".to_string(),
            ));
        }
        if self.storage.access_key.is_empty() != self.storage.secret_key.is_empty() {
            return Err(ConfigError::Invalid(
                "storage.access_key and storage.secret_key must be set together".to_string(),
            ));
        }
        if self.batch.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "batch.concurrency must be at least 1".to_string(),
            ));
        }
        if self.fetch.max_bytes == 0 || self.basic.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "fetch.max_bytes and basic.max_upload_bytes must be positive".to_string(),
            ));
        }
        if self.basic.request_timeout_secs == 0 || self.batch.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request deadlines must be positive".to_string(),
            ));
        }
        self.storage
            .resolved_public_base()
            .map_err(|e| ConfigError::Invalid(format!("cannot build public base url: {e}")))?;
        Ok(())
    }
}
