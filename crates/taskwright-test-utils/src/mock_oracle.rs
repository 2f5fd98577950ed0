// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock oracle adapter for deterministic testing.
//!
//! `MockOracle` implements `OracleAdapter` with scripted replies, enabling
//! fast, CI-runnable tests without calling a real model.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use taskwright_core::{
    AdapterType, HealthStatus, OracleAdapter, OracleRequest, OracleResponse, PluginAdapter,
    TaskwrightError,
};

/// Model name reported on every mock reply.
pub const MOCK_MODEL: &str = "mock-oracle";

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(String),
}

/// A mock oracle that returns scripted replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned. Every request is recorded.
pub struct MockOracle {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<OracleRequest>>>,
}

impl MockOracle {
    /// Create a new mock oracle with an empty queue.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock oracle pre-loaded with the given replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            script: Arc::new(Mutex::new(
                responses.into_iter().map(Scripted::Reply).collect(),
            )),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Reply(text.into()));
    }

    /// Queue a failure, surfaced as `TaskwrightError::Oracle`.
    pub async fn add_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Fail(message.into()));
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().await.clone()
    }

    /// Prompts of every request received so far.
    pub async fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }

    /// Number of scripted entries not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockOracle {
    fn name(&self) -> &str {
        "mock-oracle"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Oracle
    }

    async fn health_check(&self) -> Result<HealthStatus, TaskwrightError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TaskwrightError> {
        Ok(())
    }
}

#[async_trait]
impl OracleAdapter for MockOracle {
    async fn complete(&self, request: OracleRequest) -> Result<OracleResponse, TaskwrightError> {
        self.requests.lock().await.push(request);
        let next = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Scripted::Reply("mock response".to_string()));
        match next {
            Scripted::Reply(text) => Ok(OracleResponse {
                text,
                model: MOCK_MODEL.to_string(),
            }),
            Scripted::Fail(message) => Err(TaskwrightError::Oracle {
                message,
                source: None,
            }),
        }
    }
}

/// Builds a classification reply in the shape the intent classifier expects.
pub fn intent_reply(intent: &str, entities: serde_json::Value) -> String {
    serde_json::json!({
        "intent": intent,
        "confidence": 0.9,
        "entities": entities,
        "response": null,
    })
    .to_string()
}

/// A greeting or clarify reply carrying the oracle's own response.
pub fn direct_reply(intent: &str, response: &str) -> String {
    serde_json::json!({
        "intent": intent,
        "confidence": 0.9,
        "entities": {},
        "response": response,
    })
    .to_string()
}
