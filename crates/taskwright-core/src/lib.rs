// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for taskwright.
//!
//! This crate provides the domain types, error type and adapter traits shared
//! by the storage, oracle, auth, agent and gateway crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TaskwrightError;
pub use types::{
    AdapterType, AuthIdentity, ChatResponse, Conversation, HealthStatus, Intent, IntentEntities,
    IntentKind, Message, MessageRole, OracleRequest, OracleResponse, ResponseFormat,
    StatusFilter, Task, TaskSummary, ToolResult, now_timestamp,
};

pub use traits::{AuthAdapter, OracleAdapter, PluginAdapter, StorageAdapter};
