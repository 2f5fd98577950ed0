// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use taskwright_config::model::StorageConfig;
use taskwright_core::{
    AdapterType, Conversation, HealthStatus, Message, MessageRole, PluginAdapter, StatusFilter,
    StorageAdapter, Task, TaskwrightError,
};

use crate::database::{Database, checkpoint, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, TaskwrightError> {
        self.db.get().ok_or_else(|| TaskwrightError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TaskwrightError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".to_string()));
        };
        db.connection()
            .call(|conn| conn.execute_batch("SELECT 1;"))
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TaskwrightError> {
        if let Some(db) = self.db.get() {
            checkpoint(db.connection()).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), TaskwrightError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| TaskwrightError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), TaskwrightError> {
        checkpoint(self.db()?.connection()).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Tasks ---

    async fn create_task(
        &self,
        owner: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, TaskwrightError> {
        queries::tasks::create_task(self.db()?, owner, title, description).await
    }

    async fn get_task(&self, owner: &str, id: i64) -> Result<Option<Task>, TaskwrightError> {
        queries::tasks::get_task(self.db()?, owner, id).await
    }

    async fn list_tasks(
        &self,
        owner: &str,
        filter: StatusFilter,
    ) -> Result<Vec<Task>, TaskwrightError> {
        queries::tasks::list_tasks(self.db()?, owner, filter).await
    }

    async fn update_task(
        &self,
        owner: &str,
        id: i64,
        title: &str,
        description: Option<&str>,
    ) -> Result<Option<Task>, TaskwrightError> {
        queries::tasks::update_task(self.db()?, owner, id, title, description).await
    }

    async fn delete_task(&self, owner: &str, id: i64) -> Result<bool, TaskwrightError> {
        queries::tasks::delete_task(self.db()?, owner, id).await
    }

    async fn toggle_completion(
        &self,
        owner: &str,
        id: i64,
    ) -> Result<Option<Task>, TaskwrightError> {
        queries::tasks::toggle_completion(self.db()?, owner, id).await
    }

    // --- Conversations ---

    async fn create_conversation(&self, owner: &str) -> Result<Conversation, TaskwrightError> {
        queries::conversations::create_conversation(self.db()?, owner).await
    }

    async fn get_conversation(
        &self,
        owner: &str,
        id: i64,
    ) -> Result<Option<Conversation>, TaskwrightError> {
        queries::conversations::get_conversation(self.db()?, owner, id).await
    }

    async fn list_conversations(
        &self,
        owner: &str,
    ) -> Result<Vec<Conversation>, TaskwrightError> {
        queries::conversations::list_conversations(self.db()?, owner).await
    }

    async fn append_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, TaskwrightError> {
        queries::messages::append_message(self.db()?, conversation_id, role, content).await
    }

    async fn list_messages(
        &self,
        owner: &str,
        conversation_id: i64,
    ) -> Result<Vec<Message>, TaskwrightError> {
        queries::messages::list_messages(self.db()?, owner, conversation_id).await
    }
}
