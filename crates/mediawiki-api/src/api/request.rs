//! Request sender shared by the client and its pages.

use super::params::QueryParams;
use super::rate_limiter::RateLimiter;
use super::transport::Transport;
use crate::error::Result;
use crate::language::Language;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Placeholder replaced by the language code in the endpoint template
const LANG_PLACEHOLDER: &str = "{lang}";

/// Sends API requests with the configured User-Agent and rate limiting
///
/// One instance belongs to one client; pages created by that client keep an
/// `Arc` to it so they share its rate limiter.
pub struct WikiRequest {
    transport: Arc<dyn Transport>,
    api_url: String,
    user_agent: RwLock<String>,
    rate_limiter: Mutex<RateLimiter>,
}

impl WikiRequest {
    pub fn new(
        transport: Arc<dyn Transport>,
        api_url: impl Into<String>,
        user_agent: impl Into<String>,
        min_wait: Option<Duration>,
    ) -> Self {
        Self {
            transport,
            api_url: api_url.into(),
            user_agent: RwLock::new(user_agent.into()),
            rate_limiter: Mutex::new(RateLimiter::new(min_wait)),
        }
    }

    /// The endpoint for `language`
    pub fn api_url(&self, language: &Language) -> String {
        self.api_url.replace(LANG_PLACEHOLDER, language.code())
    }

    pub async fn user_agent(&self) -> String {
        self.user_agent.read().await.clone()
    }

    pub async fn set_user_agent(&self, user_agent: impl Into<String>) {
        *self.user_agent.write().await = user_agent.into();
    }

    pub async fn rate_limit(&self) -> Option<Duration> {
        self.rate_limiter.lock().await.min_wait()
    }

    /// Enable (`Some`) or disable (`None`) rate limiting
    pub async fn set_rate_limit(&self, min_wait: Option<Duration>) {
        self.rate_limiter.lock().await.reconfigure(min_wait);
    }

    /// Send one request to the `language` endpoint
    ///
    /// `format=json` is always set and `action` defaults to `query`. The
    /// MediaWiki `error` field is left for the caller to interpret.
    pub async fn send(&self, language: &Language, params: QueryParams) -> Result<Value> {
        let mut params = params.set("format", "json");
        params.insert_default("action", "query");

        let url = self.api_url(language);
        let user_agent = self.user_agent().await;

        debug!(url = %url, params = ?params, "Making API request");

        let mut limiter = self.rate_limiter.lock().await;
        if !limiter.is_enabled() {
            drop(limiter);
            return self.transport.get(&url, &params, &user_agent).await;
        }

        // Held across the send so concurrent callers queue behind the window
        limiter.acquire().await;
        let response = self.transport.get(&url, &params, &user_agent).await?;
        limiter.record();

        Ok(response)
    }
}
