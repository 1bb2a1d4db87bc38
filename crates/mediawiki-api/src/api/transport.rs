//! HTTP transport used to reach the MediaWiki endpoint.

use super::params::QueryParams;
use crate::error::{Result, WikiError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// A single GET against the API, returning the decoded JSON body
///
/// Implementations report network and HTTP failures as
/// [`WikiError::Transport`] and never look at the MediaWiki `error` field.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, params: &QueryParams, user_agent: &str) -> Result<Value>;
}

/// [`Transport`] backed by a pooled `reqwest` client
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, params: &QueryParams, user_agent: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .query(params)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            warn!(url = %url, status = %status, "Request failed");

            return Err(WikiError::Transport(format!(
                "Request failed with status {status}: {body}"
            )));
        }

        let value = response.json::<Value>().await?;
        debug!(url = %url, "Request successful");

        Ok(value)
    }
}
