// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for taskwright.

use thiserror::Error;

/// The primary error type used across all taskwright adapter traits and core operations.
#[derive(Debug, Error)]
pub enum TaskwrightError {
    /// Configuration errors (missing secrets, invalid values discovered at runtime).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The language-model oracle failed: transport, HTTP status, timeout, or empty reply.
    #[error("oracle error: {message}")]
    Oracle {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The oracle answered, but not with the JSON shape the intent classifier requires.
    #[error("malformed intent response: {message}")]
    MalformedIntent {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Credential verification failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A scoped lookup found nothing for this owner.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected before reaching storage (empty title, oversized field).
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TaskwrightError {
    /// Shorthand for a not-found task.
    pub fn task_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "task",
            id: id.to_string(),
        }
    }

    /// Shorthand for a not-found conversation.
    pub fn conversation_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "conversation",
            id: id.to_string(),
        }
    }

    /// Whether this error came from the oracle or the classifier's parsing of it.
    ///
    /// These are the only failures allowed to escape a chat turn.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(self, Self::Oracle { .. } | Self::MalformedIntent { .. })
    }
}
