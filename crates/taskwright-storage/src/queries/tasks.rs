// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task CRUD operations.

use rusqlite::{OptionalExtension, Row, params};
use taskwright_core::{StatusFilter, Task, TaskwrightError, now_timestamp};

use super::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS, check_length};
use crate::database::{Database, map_tr_err};

const TASK_COLUMNS: &str = "id, user_id, title, description, completed, created_at, updated_at";

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        completed: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Trims the title and enforces the column limits.
fn validate(title: &str, description: Option<&str>) -> Result<String, TaskwrightError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskwrightError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    check_length("title", title, MAX_TITLE_CHARS)?;
    if let Some(description) = description {
        check_length("description", description, MAX_DESCRIPTION_CHARS)?;
    }
    Ok(title.to_string())
}

/// Insert a new, pending task.
pub async fn create_task(
    db: &Database,
    owner: &str,
    title: &str,
    description: Option<&str>,
) -> Result<Task, TaskwrightError> {
    let title = validate(title, description)?;
    let owner = owner.to_string();
    let description = description.map(str::to_string);
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO tasks (user_id, title, description, completed, created_at, updated_at)
                     VALUES (?1, ?2, ?3, 0, ?4, ?4)
                     RETURNING {TASK_COLUMNS}"
                ),
                params![owner, title, description, now],
                task_from_row,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one task if it belongs to `owner`.
pub async fn get_task(db: &Database, owner: &str, id: i64) -> Result<Option<Task>, TaskwrightError> {
    let owner = owner.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"),
                params![id, owner],
                task_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All of the owner's tasks passing `filter`, in creation order.
pub async fn list_tasks(
    db: &Database,
    owner: &str,
    filter: StatusFilter,
) -> Result<Vec<Task>, TaskwrightError> {
    let owner = owner.to_string();
    let completed: Option<bool> = match filter {
        StatusFilter::All => None,
        StatusFilter::Pending => Some(false),
        StatusFilter::Completed => Some(true),
    };
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE user_id = ?1 AND (?2 IS NULL OR completed = ?2)
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![owner, completed], task_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite title and description. `None` when the task is not the owner's.
pub async fn update_task(
    db: &Database,
    owner: &str,
    id: i64,
    title: &str,
    description: Option<&str>,
) -> Result<Option<Task>, TaskwrightError> {
    let title = validate(title, description)?;
    let owner = owner.to_string();
    let description = description.map(str::to_string);
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "UPDATE tasks SET title = ?3, description = ?4, updated_at = ?5
                     WHERE id = ?1 AND user_id = ?2
                     RETURNING {TASK_COLUMNS}"
                ),
                params![id, owner, title, description, now],
                task_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Flip the completion flag and return the task in its new state.
pub async fn toggle_completion(
    db: &Database,
    owner: &str,
    id: i64,
) -> Result<Option<Task>, TaskwrightError> {
    let owner = owner.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "UPDATE tasks SET completed = NOT completed, updated_at = ?3
                     WHERE id = ?1 AND user_id = ?2
                     RETURNING {TASK_COLUMNS}"
                ),
                params![id, owner, now],
                task_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Returns whether a row was removed.
pub async fn delete_task(db: &Database, owner: &str, id: i64) -> Result<bool, TaskwrightError> {
    let owner = owner.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![id, owner],
            )
        })
        .await
        .map(|removed| removed > 0)
        .map_err(map_tr_err)
}
