use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Remote download settings for URL uploads and manifests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// TOML: `fetch.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout, body included.
    /// TOML: `fetch.timeout_secs`. Default: `30`.
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,

    /// Largest remote payload accepted.
    /// TOML: `fetch.max_bytes`. Default: 20 MiB.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// TOML: `fetch.max_redirects`. Default: `5`.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// TOML: `fetch.user_agent`.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_fetch_timeout_secs(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

/// Manifest (batch) ingestion settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Manifest entries processed at the same time.
    /// TOML: `batch.concurrency`. Default: `4`.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Deadline for a whole manifest request.
    /// TOML: `batch.timeout_secs`. Default: `300`.
    #[serde(default = "default_batch_timeout_secs")]
    pub timeout_secs: u64,

    /// Description stored on every record created from a manifest.
    /// TOML: `batch.description`. Default: `Uploaded via JSON`.
    #[serde(default = "default_batch_description")]
    pub description: String,
}

impl BatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_batch_timeout_secs(),
            description: default_batch_description(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_max_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_max_redirects() -> usize {
    5
}

fn default_user_agent() -> String {
    concat!("imgshelf/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_concurrency() -> usize {
    4
}

fn default_batch_timeout_secs() -> u64 {
    300
}

fn default_batch_description() -> String {
    "Uploaded via JSON".to_string()
}
