//! Network acquisition of external documents.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::AppError;

const USER_AGENT: &str = concat!("refgraph/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Fetches the raw bytes published at a source location.
///
/// Implementations make a single attempt; retries, backoff and timeouts are
/// applied by the crawl controller.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, location: &Url) -> Result<Vec<u8>, AppError>;
}

/// HTTP fetcher backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, location: &Url) -> Result<Vec<u8>, AppError> {
        let response = self
            .client
            .get(location.clone())
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        tracing::debug!("Fetched {} ({} bytes)", location, body.len());
        Ok(body.to_vec())
    }
}
