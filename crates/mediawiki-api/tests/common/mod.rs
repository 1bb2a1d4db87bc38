//! Shared helpers for the client integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use mediawiki_api::{MediaWikiClient, QueryParams, Transport, WikiError};
use serde_json::Value;
use shared::MediaWikiConfig;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// One request seen by [`FixtureTransport`]
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub params: QueryParams,
    pub at: Instant,
}

/// In-memory transport answering requests from JSON fixtures
///
/// A request is answered by the first route whose expected parameters are
/// all present with the same values.
#[derive(Default)]
pub struct FixtureTransport {
    routes: Vec<(Vec<(String, String)>, Value)>,
    calls: Mutex<Vec<Call>>,
}

impl FixtureTransport {
    /// A transport that already serves the language list
    pub fn new() -> Self {
        Self::default().route(&[("meta", "siteinfo")], fixture("languages.json"))
    }

    pub fn route(mut self, expect: &[(&str, &str)], response: Value) -> Self {
        let expect = expect
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.routes.push((expect, response));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls carrying `key=value`
    pub fn calls_with(&self, key: &str, value: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.params.get(key) == Some(value))
            .collect()
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn get(
        &self,
        url: &str,
        params: &QueryParams,
        _user_agent: &str,
    ) -> mediawiki_api::Result<Value> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            params: params.clone(),
            at: Instant::now(),
        });

        self.routes
            .iter()
            .find(|(expect, _)| {
                expect
                    .iter()
                    .all(|(k, v)| params.get(k) == Some(v.as_str()))
            })
            .map(|(_, response)| response.clone())
            .ok_or_else(|| WikiError::Transport(format!("no fixture for {params:?}")))
    }
}

/// Load `tests/fixtures/<name>`
pub fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("Invalid fixture {name}: {e}"))
}

pub async fn client(transport: &Arc<FixtureTransport>) -> MediaWikiClient {
    client_with_config(transport, MediaWikiConfig::default()).await
}

pub async fn client_with_config(
    transport: &Arc<FixtureTransport>,
    config: MediaWikiConfig,
) -> MediaWikiClient {
    MediaWikiClient::with_transport(&config, transport.clone())
        .await
        .expect("Failed to build client over fixture transport")
}
