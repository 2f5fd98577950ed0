// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends.

use async_trait::async_trait;

use crate::error::TaskwrightError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Conversation, Message, MessageRole, StatusFilter, Task};

/// Adapter for the task and conversation store.
///
/// Every read and write is scoped by an owner identifier. A row owned by
/// someone else is indistinguishable from a missing row: lookups return
/// `None` and mutations return `false`.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Opens the backend and applies pending migrations.
    async fn initialize(&self) -> Result<(), TaskwrightError>;

    /// Flushes pending writes and releases connections.
    async fn close(&self) -> Result<(), TaskwrightError>;

    // --- Tasks ---

    async fn create_task(
        &self,
        owner: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, TaskwrightError>;

    async fn get_task(&self, owner: &str, id: i64) -> Result<Option<Task>, TaskwrightError>;

    /// Lists the owner's tasks in creation order.
    async fn list_tasks(
        &self,
        owner: &str,
        filter: StatusFilter,
    ) -> Result<Vec<Task>, TaskwrightError>;

    /// Overwrites title and description. Returns `None` when the task is not the owner's.
    async fn update_task(
        &self,
        owner: &str,
        id: i64,
        title: &str,
        description: Option<&str>,
    ) -> Result<Option<Task>, TaskwrightError>;

    /// Returns whether a row was removed.
    async fn delete_task(&self, owner: &str, id: i64) -> Result<bool, TaskwrightError>;

    /// Flips the completion flag and returns the task in its new state.
    async fn toggle_completion(
        &self,
        owner: &str,
        id: i64,
    ) -> Result<Option<Task>, TaskwrightError>;

    // --- Conversations ---

    async fn create_conversation(&self, owner: &str) -> Result<Conversation, TaskwrightError>;

    async fn get_conversation(
        &self,
        owner: &str,
        id: i64,
    ) -> Result<Option<Conversation>, TaskwrightError>;

    /// Lists the owner's conversations, most recently active first.
    async fn list_conversations(&self, owner: &str)
    -> Result<Vec<Conversation>, TaskwrightError>;

    /// Appends a message and bumps the conversation's `updated_at`.
    async fn append_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, TaskwrightError>;

    /// Returns the conversation's messages oldest first. Empty when the
    /// conversation does not belong to `owner`.
    async fn list_messages(
        &self,
        owner: &str,
        conversation_id: i64,
    ) -> Result<Vec<Message>, TaskwrightError>;
}
