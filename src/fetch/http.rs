use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use super::{FetchedObject, RemoteFetcher};
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::storage::DEFAULT_CONTENT_TYPE;

/// `reqwest` backed fetcher with bounded time, redirects and payload size.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new(cfg: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(cfg.max_redirects))
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.timeout())
            .build()?;

        Ok(Self {
            client,
            max_bytes: cfg.max_bytes,
        })
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    #[tracing::instrument(skip(self, url), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<FetchedObject, FetchError> {
        let mut resp = self.client.get(url.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        let limit = self.max_bytes;
        if resp
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(FetchError::TooLarge { limit });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        // Content-Length may be absent or wrong; enforce the limit on what actually arrives.
        let mut body = BytesMut::new();
        while let Some(chunk) = resp.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        let bytes: Bytes = body.freeze();
        debug!(len = bytes.len(), content_type = %content_type, "remote object fetched");
        Ok(FetchedObject {
            bytes,
            content_type,
        })
    }
}
