//! Scripted transport for unit tests.

use crate::api::{QueryParams, Transport};
use crate::error::{Result, WikiError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub url: String,
    pub params: QueryParams,
    pub user_agent: String,
    pub at: Instant,
}

struct Route {
    expect: Vec<(String, String)>,
    absent: Vec<String>,
    response: Value,
}

impl Route {
    fn matches(&self, params: &QueryParams) -> bool {
        self.expect
            .iter()
            .all(|(k, v)| params.get(k) == Some(v.as_str()))
            && self.absent.iter().all(|k| !params.contains(k))
    }
}

/// Answers each request with the first route whose parameters match
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    routes: Vec<Route>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, expect: &[(&str, &str)], response: Value) -> Self {
        self.route_without(expect, &[], response)
    }

    pub fn route_without(mut self, expect: &[(&str, &str)], absent: &[&str], response: Value) -> Self {
        self.routes.push(Route {
            expect: expect
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            absent: absent.iter().map(|k| k.to_string()).collect(),
            response,
        });
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, params: &QueryParams, user_agent: &str) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            params: params.clone(),
            user_agent: user_agent.to_string(),
            at: Instant::now(),
        });

        self.routes
            .iter()
            .find(|route| route.matches(params))
            .map(|route| route.response.clone())
            .ok_or_else(|| WikiError::Transport(format!("no scripted response for {params:?}")))
    }
}
