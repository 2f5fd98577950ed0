// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The five task tools and their dispatch to storage.
//!
//! Every call produces a [`ToolResult`]. Storage errors are converted to
//! `{success: false, message: "Error: ..."}` and never escape [`ToolDispatcher::dispatch`].

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use strum::{Display, EnumString, IntoStaticStr};
use taskwright_core::{
    StatusFilter, StorageAdapter, Task, TaskSummary, TaskwrightError, ToolResult,
};
use tracing::{debug, warn};

/// Names of the dispatchable tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ToolKind {
    AddTask,
    ListTasks,
    CompleteTask,
    DeleteTask,
    UpdateTask,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::AddTask,
        ToolKind::ListTasks,
        ToolKind::CompleteTask,
        ToolKind::DeleteTask,
        ToolKind::UpdateTask,
    ];

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::AddTask => "Create a new task for the user",
            ToolKind::ListTasks => "List the user's tasks, optionally filtered by status",
            ToolKind::CompleteTask => "Toggle a task's completion status",
            ToolKind::DeleteTask => "Delete a task permanently",
            ToolKind::UpdateTask => "Update a task's title or description",
        }
    }

    /// JSON Schema for the tool's arguments, excluding the owner.
    pub fn input_schema(self) -> Value {
        let task_id = json!({
            "type": "integer",
            "description": "ID of the task"
        });
        match self {
            ToolKind::AddTask => json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "minLength": 1,
                        "maxLength": 200,
                        "description": "Task title"
                    },
                    "description": {
                        "type": "string",
                        "maxLength": 1000,
                        "description": "Optional task description"
                    }
                },
                "required": ["title"]
            }),
            ToolKind::ListTasks => json!({
                "type": "object",
                "properties": {
                    "status": {
                        "type": "string",
                        "enum": ["all", "pending", "completed"],
                        "description": "Filter by completion status"
                    }
                }
            }),
            ToolKind::CompleteTask | ToolKind::DeleteTask => json!({
                "type": "object",
                "properties": { "task_id": task_id },
                "required": ["task_id"]
            }),
            ToolKind::UpdateTask => json!({
                "type": "object",
                "properties": {
                    "task_id": task_id,
                    "title": {
                        "type": "string",
                        "minLength": 1,
                        "maxLength": 200,
                        "description": "New title"
                    },
                    "description": {
                        "type": "string",
                        "maxLength": 1000,
                        "description": "New description"
                    }
                },
                "required": ["task_id"]
            }),
        }
    }

    /// `{name, description, input_schema}` for listing the tool.
    pub fn definition(self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "input_schema": self.input_schema(),
        })
    }
}

/// A tool invocation with typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    AddTask {
        title: Option<String>,
        description: Option<String>,
    },
    ListTasks {
        status: StatusFilter,
    },
    CompleteTask {
        task_id: Option<i64>,
    },
    DeleteTask {
        task_id: Option<i64>,
    },
    UpdateTask {
        task_id: Option<i64>,
        title: Option<String>,
        description: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct ToolArguments {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    task_id: Option<i64>,
}

impl ToolCall {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::AddTask { .. } => ToolKind::AddTask,
            ToolCall::ListTasks { .. } => ToolKind::ListTasks,
            ToolCall::CompleteTask { .. } => ToolKind::CompleteTask,
            ToolCall::DeleteTask { .. } => ToolKind::DeleteTask,
            ToolCall::UpdateTask { .. } => ToolKind::UpdateTask,
        }
    }

    /// Builds a call from a JSON argument object. Unrelated keys are ignored.
    pub fn from_arguments(kind: ToolKind, arguments: Value) -> Result<Self, TaskwrightError> {
        let args: ToolArguments = if arguments.is_null() {
            ToolArguments::default()
        } else {
            serde_json::from_value(arguments).map_err(|e| {
                TaskwrightError::Validation(format!("invalid arguments for {kind}: {e}"))
            })?
        };
        Ok(match kind {
            ToolKind::AddTask => ToolCall::AddTask {
                title: args.title,
                description: args.description,
            },
            ToolKind::ListTasks => ToolCall::ListTasks {
                status: StatusFilter::from_entity(args.status.as_deref()),
            },
            ToolKind::CompleteTask => ToolCall::CompleteTask {
                task_id: args.task_id,
            },
            ToolKind::DeleteTask => ToolCall::DeleteTask {
                task_id: args.task_id,
            },
            ToolKind::UpdateTask => ToolCall::UpdateTask {
                task_id: args.task_id,
                title: args.title,
                description: args.description,
            },
        })
    }
}

/// Executes tool calls against an owner's tasks.
pub struct ToolDispatcher {
    storage: Arc<dyn StorageAdapter>,
}

impl ToolDispatcher {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Definitions of all tools, sorted by name.
    pub fn tool_definitions() -> Vec<Value> {
        let mut defs: Vec<Value> = ToolKind::ALL.iter().map(|k| k.definition()).collect();
        defs.sort_by(|a, b| {
            a["name"]
                .as_str()
                .unwrap_or("")
                .cmp(b["name"].as_str().unwrap_or(""))
        });
        defs
    }

    /// Runs one call. Never fails: errors become an unsuccessful result.
    pub async fn dispatch(&self, owner: &str, call: ToolCall) -> ToolResult {
        let tool = call.kind();
        debug!(owner, tool = %tool, "dispatching tool");
        match self.execute(owner, call).await {
            Ok(result) => result,
            Err(e) => {
                warn!(owner, tool = %tool, error = %e, "tool dispatch failed");
                ToolResult::failure(format!("Error: {e}"))
            }
        }
    }

    /// Looks the tool up by name and dispatches it with JSON arguments.
    pub async fn dispatch_named(&self, owner: &str, name: &str, arguments: Value) -> ToolResult {
        let Ok(kind) = name.parse::<ToolKind>() else {
            return ToolResult::failure(format!("Unknown tool: {name}"));
        };
        match ToolCall::from_arguments(kind, arguments) {
            Ok(call) => self.dispatch(owner, call).await,
            Err(e) => ToolResult::failure(format!("Error: {e}")),
        }
    }

    async fn execute(&self, owner: &str, call: ToolCall) -> Result<ToolResult, TaskwrightError> {
        match call {
            ToolCall::AddTask { title, description } => {
                self.add_task(owner, title.as_deref(), description.as_deref())
                    .await
            }
            ToolCall::ListTasks { status } => self.list_tasks(owner, status).await,
            ToolCall::CompleteTask { task_id } => {
                let Some(id) = task_id else {
                    return Ok(ToolResult::failure("Please specify which task to complete."));
                };
                self.complete_task(owner, id).await
            }
            ToolCall::DeleteTask { task_id } => {
                let Some(id) = task_id else {
                    return Ok(ToolResult::failure("Please specify which task to delete."));
                };
                self.delete_task(owner, id).await
            }
            ToolCall::UpdateTask {
                task_id,
                title,
                description,
            } => {
                let Some(id) = task_id else {
                    return Ok(ToolResult::failure("Please specify which task to update."));
                };
                self.update_task(owner, id, title.as_deref(), description.as_deref())
                    .await
            }
        }
    }

    async fn add_task(
        &self,
        owner: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<ToolResult, TaskwrightError> {
        let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(ToolResult::failure("Task title cannot be empty."));
        };
        let description = description.filter(|d| !d.trim().is_empty());

        let task = self.storage.create_task(owner, title, description).await?;
        debug!(owner, task_id = task.id, "task added");
        Ok(
            ToolResult::ok(format!("I've added '{}' to your task list!", task.title))
                .with_task(TaskSummary::brief(&task)),
        )
    }

    async fn list_tasks(
        &self,
        owner: &str,
        status: StatusFilter,
    ) -> Result<ToolResult, TaskwrightError> {
        let tasks = self.storage.list_tasks(owner, status).await?;
        let count = tasks.len();

        let message = match (status, count) {
            (StatusFilter::Pending, 0) => "You have no pending tasks.".to_string(),
            (StatusFilter::Completed, 0) => "You have no completed tasks.".to_string(),
            (StatusFilter::All, 0) => {
                "You don't have any tasks yet. Add one to get started!".to_string()
            }
            (StatusFilter::Pending, n) => format!("You have {n} pending task(s):"),
            (StatusFilter::Completed, n) => format!("You've completed {n} task(s):"),
            (StatusFilter::All, n) => format!("You have {n} task(s) total:"),
        };

        Ok(ToolResult::ok(message).with_tasks(tasks.iter().map(TaskSummary::full).collect()))
    }

    async fn complete_task(&self, owner: &str, id: i64) -> Result<ToolResult, TaskwrightError> {
        let Some(task) = self.storage.toggle_completion(owner, id).await? else {
            return Ok(not_found(id));
        };
        let message = if task.completed {
            format!("Great job! '{}' is marked as complete.", task.title)
        } else {
            format!("'{}' is marked as incomplete again.", task.title)
        };
        Ok(ToolResult::ok(message).with_task(TaskSummary::brief(&task)))
    }

    async fn delete_task(&self, owner: &str, id: i64) -> Result<ToolResult, TaskwrightError> {
        if !self.storage.delete_task(owner, id).await? {
            return Ok(not_found(id));
        }
        Ok(ToolResult::ok(format!("Task {id} has been deleted.")))
    }

    /// Merges through [`Task::merge_edit`].
    async fn update_task(
        &self,
        owner: &str,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<ToolResult, TaskwrightError> {
        let Some(existing) = self.storage.get_task(owner, id).await? else {
            return Ok(not_found(id));
        };

        let (title, description) = existing.merge_edit(title, description);

        let Some(task) = self
            .storage
            .update_task(owner, id, &title, description.as_deref())
            .await?
        else {
            return Ok(not_found(id));
        };
        Ok(
            ToolResult::ok(format!("Task updated! '{}' is ready.", task.title))
                .with_task(updated_summary(&task)),
        )
    }
}

fn not_found(id: i64) -> ToolResult {
    ToolResult::failure(format!("Task {id} not found."))
}

fn updated_summary(task: &Task) -> TaskSummary {
    TaskSummary {
        created_at: None,
        ..TaskSummary::full(task)
    }
}
