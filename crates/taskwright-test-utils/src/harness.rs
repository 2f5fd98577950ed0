// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end agent testing.
//!
//! `TestHarness` assembles a complete agent with a mock oracle and a temp
//! SQLite database, and exposes `chat()` to drive full turns in tests.

use std::sync::Arc;

use taskwright_agent::{AgentSettings, TaskAgent};
use taskwright_config::model::{StorageConfig, TaskwrightConfig};
use taskwright_core::{ChatResponse, StorageAdapter, TaskwrightError};
use taskwright_storage::SqliteStorage;

use crate::mock_oracle::MockOracle;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    config: TaskwrightConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            config: TaskwrightConfig::default(),
        }
    }

    /// Set scripted oracle replies.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Number of prior messages included in reply prompts.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.config.agent.history_window = window;
        self
    }

    /// Reply used when a greeting or clarify turn has no oracle response.
    pub fn with_fallback_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.config.agent.fallback_greeting = greeting.into();
        self
    }

    /// Build the harness, creating the temp database and agent.
    pub async fn build(self) -> Result<TestHarness, TaskwrightError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| TaskwrightError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let oracle = Arc::new(MockOracle::with_responses(self.responses));
        let agent = TaskAgent::new(
            storage.clone(),
            oracle.clone(),
            AgentSettings::from_config(&config),
        );

        Ok(TestHarness {
            oracle,
            storage,
            agent: Arc::new(agent),
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock oracle and temp storage.
pub struct TestHarness {
    /// The scripted oracle shared with the agent.
    pub oracle: Arc<MockOracle>,
    /// SQLite storage (temp DB, removed on drop).
    pub storage: Arc<dyn StorageAdapter>,
    /// The agent under test.
    pub agent: Arc<TaskAgent>,
    /// Configuration the harness was built from.
    pub config: TaskwrightConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run one chat turn through the agent.
    pub async fn chat(
        &self,
        message: &str,
        owner: &str,
        conversation_id: Option<i64>,
    ) -> Result<ChatResponse, TaskwrightError> {
        self.agent.chat(message, owner, conversation_id).await
    }

    /// Add a reply to the mock oracle's queue.
    pub async fn add_oracle_response(&self, text: impl Into<String>) {
        self.oracle.add_response(text).await;
    }
}
