// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversational task agent.
//!
//! A chat turn flows through:
//! - [`classifier`]: oracle call returning a typed [`taskwright_core::Intent`]
//! - [`resolver`]: task reference to task id, or a clarification
//! - [`dispatcher`]: one storage operation wrapped in a [`taskwright_core::ToolResult`]
//! - [`orchestrator`]: the per-turn state machine tying them together

pub mod classifier;
pub mod dispatcher;
pub mod matcher;
pub mod orchestrator;
pub mod prompt;
pub mod resolver;

pub use classifier::{IntentClassifier, parse_intent};
pub use dispatcher::{ToolCall, ToolDispatcher, ToolKind};
pub use matcher::{ScoredTask, rank};
pub use orchestrator::{AgentSettings, NOT_SURE_MESSAGE, TaskAgent, TurnState};
pub use resolver::{Resolution, TaskResolver};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use taskwright_config::model::StorageConfig;
    use taskwright_core::StorageAdapter;
    use taskwright_storage::SqliteStorage;

    /// A migrated SQLite store in a fresh temp directory.
    pub(crate) async fn open_storage() -> (Arc<dyn StorageAdapter>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("agent.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        (Arc::new(storage), dir)
    }
}
