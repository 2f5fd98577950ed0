// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `taskwright task` command implementation.
//!
//! Direct CRUD against storage, bypassing the agent and the oracle.

use clap::{Args, Subcommand};
use colored::Colorize;
use taskwright_config::TaskwrightConfig;
use taskwright_core::{StatusFilter, StorageAdapter, Task, TaskwrightError};

use crate::DEFAULT_USER;
use crate::serve::open_storage;

#[derive(Args, Debug)]
pub struct TaskArgs {
    /// Owner of the tasks.
    #[arg(long, global = true, default_value = DEFAULT_USER)]
    pub user: String,

    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a task.
    Add {
        title: String,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// List tasks.
    List {
        #[arg(long, default_value = "all", value_parser = ["all", "pending", "completed"])]
        status: String,
    },
    /// Change a task's title or description. An empty description clears it.
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Delete a task.
    Delete { id: i64 },
    /// Flip a task between pending and completed.
    Toggle { id: i64 },
}

pub async fn run_task(config: &TaskwrightConfig, args: TaskArgs) -> Result<(), TaskwrightError> {
    let storage = open_storage(config).await?;
    let result = execute(storage.as_ref(), &args.user, args.command).await;
    storage.close().await?;

    for line in result? {
        println!("{line}");
    }
    Ok(())
}

/// Runs one command and returns the lines to print.
async fn execute(
    storage: &dyn StorageAdapter,
    owner: &str,
    command: TaskCommand,
) -> Result<Vec<String>, TaskwrightError> {
    match command {
        TaskCommand::Add { title, description } => {
            let task = storage
                .create_task(owner, &title, description.as_deref())
                .await?;
            Ok(vec![format!("{} {}", "added".green(), format_task(&task))])
        }
        TaskCommand::List { status } => {
            let tasks = storage
                .list_tasks(owner, StatusFilter::from_entity(Some(&status)))
                .await?;
            if tasks.is_empty() {
                return Ok(vec!["no tasks".dimmed().to_string()]);
            }
            Ok(tasks.iter().map(format_task).collect())
        }
        TaskCommand::Update {
            id,
            title,
            description,
        } => {
            let existing = storage
                .get_task(owner, id)
                .await?
                .ok_or_else(|| TaskwrightError::task_not_found(id))?;
            let (title, description) =
                existing.merge_edit(title.as_deref(), description.as_deref());
            let task = storage
                .update_task(owner, id, &title, description.as_deref())
                .await?
                .ok_or_else(|| TaskwrightError::task_not_found(id))?;
            Ok(vec![format!("{} {}", "updated".green(), format_task(&task))])
        }
        TaskCommand::Delete { id } => {
            if !storage.delete_task(owner, id).await? {
                return Err(TaskwrightError::task_not_found(id));
            }
            Ok(vec![format!("Task {id} deleted")])
        }
        TaskCommand::Toggle { id } => {
            let task = storage
                .toggle_completion(owner, id)
                .await?
                .ok_or_else(|| TaskwrightError::task_not_found(id))?;
            Ok(vec![format_task(&task)])
        }
    }
}

/// One-line rendering: `[x] #3 Buy milk - 2 litres`.
pub fn format_task(task: &Task) -> String {
    let mark = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!("{mark} #{} {}", task.id, task.title);
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(" - ");
        line.push_str(description);
    }
    line
}
