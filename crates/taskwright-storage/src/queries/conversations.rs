// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use rusqlite::{OptionalExtension, Row, params};
use taskwright_core::{Conversation, TaskwrightError, now_timestamp};

use crate::database::{Database, map_tr_err};

const CONVERSATION_COLUMNS: &str = "id, user_id, title, created_at, updated_at";

fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Start a new conversation with the default title.
pub async fn create_conversation(
    db: &Database,
    owner: &str,
) -> Result<Conversation, TaskwrightError> {
    let owner = owner.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO conversations (user_id, created_at, updated_at)
                     VALUES (?1, ?2, ?2)
                     RETURNING {CONVERSATION_COLUMNS}"
                ),
                params![owner, now],
                conversation_from_row,
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_conversation(
    db: &Database,
    owner: &str,
    id: i64,
) -> Result<Option<Conversation>, TaskwrightError> {
    let owner = owner.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1 AND user_id = ?2"
                ),
                params![id, owner],
                conversation_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// The owner's conversations, most recently active first.
pub async fn list_conversations(
    db: &Database,
    owner: &str,
) -> Result<Vec<Conversation>, TaskwrightError> {
    let owner = owner.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE user_id = ?1
                 ORDER BY updated_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![owner], conversation_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("conversations.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_uses_placeholder_title() {
        let (db, _dir) = setup_db().await;
        let conv = create_conversation(&db, "u1").await.unwrap();
        assert_eq!(conv.title, "New Conversation");
        assert_eq!(conv.user_id, "u1");
        assert_eq!(conv.created_at, conv.updated_at);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_is_owner_scoped() {
        let (db, _dir) = setup_db().await;
        let conv = create_conversation(&db, "u1").await.unwrap();

        assert_eq!(
            get_conversation(&db, "u1", conv.id).await.unwrap(),
            Some(conv.clone())
        );
        assert!(get_conversation(&db, "u2", conv.id).await.unwrap().is_none());
        assert!(get_conversation(&db, "u1", conv.id + 100).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_only_returns_own_conversations() {
        let (db, _dir) = setup_db().await;
        let first = create_conversation(&db, "u1").await.unwrap();
        create_conversation(&db, "u2").await.unwrap();
        let second = create_conversation(&db, "u1").await.unwrap();

        let listed = list_conversations(&db, "u1").await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&first.id));
        assert!(ids.contains(&second.id));
        db.close().await.unwrap();
    }
}
