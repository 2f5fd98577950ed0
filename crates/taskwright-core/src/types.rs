// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the agent pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Formats the current UTC time the way every stored timestamp is written.
///
/// Millisecond precision, lexicographically sortable.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

impl HealthStatus {
    /// Short label used in health endpoint payloads.
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded(_) => "degraded",
            HealthStatus::Unhealthy(_) => "unhealthy",
        }
    }
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Oracle,
    Auth,
}

// --- Persistence entities ---

/// A single to-do item owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    /// Applies a partial edit and returns the `(title, description)` to store.
    ///
    /// An absent or blank title keeps the current one. An absent description
    /// keeps the current one; a blank description clears it.
    pub fn merge_edit(
        &self,
        title: Option<&str>,
        description: Option<&str>,
    ) -> (String, Option<String>) {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.title)
            .to_string();
        let description = match description {
            Some(d) if d.trim().is_empty() => None,
            Some(d) => Some(d.to_string()),
            None => self.description.clone(),
        };
        (title, description)
    }
}

/// A chat thread owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Author of a stored message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// One append-only entry in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub role: MessageRole,
    pub content: String,
    pub created_at: String,
}

/// Completion filter accepted by `list_tasks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    /// Parses an entity value, treating anything unrecognized (or absent) as `All`.
    pub fn from_entity(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.trim().to_ascii_lowercase().parse().ok())
            .unwrap_or_default()
    }
}

// --- Intent classification ---

/// The classified purpose of a user message.
///
/// Any string the oracle returns outside the seven known kinds deserializes
/// to `Unknown` rather than failing the parse.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IntentKind {
    Add,
    List,
    Complete,
    Delete,
    Update,
    Clarify,
    Greeting,
    #[default]
    #[serde(other)]
    Unknown,
}

impl IntentKind {
    /// Greeting and clarify are answered directly from the oracle's `response` field.
    pub fn is_direct_reply(self) -> bool {
        matches!(self, IntentKind::Greeting | IntentKind::Clarify)
    }

    /// Complete, delete and update act on one existing task and need resolution first.
    pub fn needs_task_reference(self) -> bool {
        matches!(
            self,
            IntentKind::Complete | IntentKind::Delete | IntentKind::Update
        )
    }
}

/// Entities extracted alongside an intent. Every field is nullable.
///
/// Values are taken as the oracle gave them: numbers and booleans become
/// their JSON text instead of failing the parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentEntities {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub status: Option<String>,
    /// Raw task reference as the oracle gave it (number or string).
    #[serde(default, deserialize_with = "deserialize_task_ref")]
    pub task_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub task_description: Option<String>,
}

/// Strings, numbers and booleans as text; null stays absent.
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(scalar @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => {
            Ok(Some(scalar.to_string()))
        }
        Some(other) => Err(D::Error::custom(format!("expected text, got {other}"))),
    }
}

/// Accepts `3`, `"3"`, `"#3"` or null for the `task_id` entity.
fn deserialize_task_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim().trim_start_matches('#').trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(other) => Some(other.to_string()),
    })
}

/// A number, a numeric string, or nothing. Anything else is dropped.
fn deserialize_confidence<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Unrecognized strings and non-string values both become `Unknown`.
fn deserialize_intent_kind<'de, D>(deserializer: D) -> Result<IntentKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => {
            s.trim().to_ascii_lowercase().parse().unwrap_or_default()
        }
        _ => IntentKind::Unknown,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A per-turn, non-persisted classification of the user's message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "intent", default, deserialize_with = "deserialize_intent_kind")]
    pub kind: IntentKind,
    #[serde(default, deserialize_with = "deserialize_confidence")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: IntentEntities,
    /// Oracle-supplied reply for greeting/clarify turns.
    #[serde(rename = "response", default, deserialize_with = "deserialize_text")]
    pub direct_response: Option<String>,
}

// --- Tool results ---

/// Task projection embedded in a [`ToolResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl TaskSummary {
    /// Id, title and completion flag only.
    pub fn brief(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: None,
            completed: task.completed,
            created_at: None,
        }
    }

    /// Every listed field; a missing description renders as an empty string.
    pub fn full(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: Some(task.description.clone().unwrap_or_default()),
            completed: task.completed,
            created_at: Some(task.created_at.clone()),
        }
    }
}

/// The uniform outcome of every dispatched tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskSummary>>,
}

impl ToolResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            task: None,
            tasks: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            task: None,
            tasks: None,
        }
    }

    pub fn with_task(mut self, task: TaskSummary) -> Self {
        self.task = Some(task);
        self
    }

    pub fn with_tasks(mut self, tasks: Vec<TaskSummary>) -> Self {
        self.tasks = Some(tasks);
        self
    }
}

/// What a chat turn hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: i64,
    pub intent: IntentKind,
    pub tool_result: Option<ToolResult>,
}

// --- Oracle types ---

/// Output shape requested from the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// The reply must be a single JSON object.
    JsonObject,
}

/// A single-prompt completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub prompt: String,
    pub format: ResponseFormat,
    pub max_tokens: Option<u32>,
}

impl OracleRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Text,
            max_tokens: None,
        }
    }

    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::JsonObject,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// The oracle's reply text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleResponse {
    pub text: String,
    pub model: String,
}

// --- Auth types ---

/// A verified caller identity. `user_id` is the owner identifier for all scoping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}
