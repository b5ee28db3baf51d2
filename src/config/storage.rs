use serde::{Deserialize, Serialize};
use url::Url;

/// Which object store implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Any S3-compatible bucket.
    #[default]
    S3,
    /// Process-local map; contents vanish on restart.
    Memory,
}

/// Object storage configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// TOML: `storage.backend`. Default: `s3`.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Bucket name. Required for the `s3` backend.
    /// TOML: `storage.bucket`.
    #[serde(default)]
    pub bucket: String,

    /// AWS region (or the region string expected by a compatible server).
    /// TOML: `storage.region`. Default: `us-east-1`.
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible servers such as MinIO.
    /// TOML: `storage.endpoint`. Example: `http://127.0.0.1:9000`.
    #[serde(default)]
    pub endpoint: Option<Url>,

    /// Address objects as `{endpoint}/{bucket}/{key}` instead of virtual-hosted style.
    /// TOML: `storage.path_style`. Default: `false`.
    #[serde(default)]
    pub path_style: bool,

    /// Static access key. Empty means the default credential chain.
    /// TOML: `storage.access_key`.
    #[serde(default)]
    pub access_key: String,

    /// Static secret key. Empty means the default credential chain.
    /// TOML: `storage.secret_key`.
    #[serde(default)]
    pub secret_key: String,

    /// Prefix that public object URLs are built from, e.g. a CDN origin.
    /// TOML: `storage.public_base_url`. Derived from bucket/region/endpoint when unset.
    #[serde(default)]
    pub public_base_url: Option<Url>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: String::new(),
            region: default_region(),
            endpoint: None,
            path_style: false,
            access_key: String::new(),
            secret_key: String::new(),
            public_base_url: None,
        }
    }
}

impl StorageConfig {
    /// Base URL every public object URL starts with.
    ///
    /// Precedence: `public_base_url`, then `{endpoint}/{bucket}/` in path style, then
    /// `{endpoint scheme}://{bucket}.{endpoint host}/`, then the AWS virtual-hosted form.
    pub fn resolved_public_base(&self) -> Result<Url, url::ParseError> {
        if let Some(base) = &self.public_base_url {
            return Ok(base.clone());
        }

        match &self.endpoint {
            Some(endpoint) if self.path_style => {
                let root = endpoint.as_str().trim_end_matches('/');
                Url::parse(&format!("{root}/{}/", self.bucket))
            }
            Some(endpoint) => {
                let host = endpoint.host_str().unwrap_or_default();
                let port = endpoint
                    .port()
                    .map(|p| format!(":{p}"))
                    .unwrap_or_default();
                Url::parse(&format!(
                    "{}://{}.{host}{port}/",
                    endpoint.scheme(),
                    self.bucket
                ))
            }
            None => Url::parse(&format!(
                "https://{}.s3.{}.amazonaws.com/",
                self.bucket, self.region
            )),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}
