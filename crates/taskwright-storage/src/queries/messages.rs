// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message append and history reads.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{Row, params};
use taskwright_core::{Message, MessageRole, TaskwrightError, now_timestamp};

use super::{MAX_CONTENT_CHARS, check_length};
use crate::database::{Database, map_tr_err};

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    let role: String = row.get(2)?;
    let role = MessageRole::from_str(&role)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        role,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Append a message and bump the conversation's `updated_at` in one transaction.
///
/// `updated_at` only moves forward, even if the wall clock steps back.
pub async fn append_message(
    db: &Database,
    conversation_id: i64,
    role: MessageRole,
    content: &str,
) -> Result<Message, TaskwrightError> {
    check_length("content", content, MAX_CONTENT_CHARS)?;
    let content = content.to_string();
    let now = now_timestamp();
    let inserted = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let bumped = tx.execute(
                "UPDATE conversations SET updated_at = MAX(updated_at, ?2) WHERE id = ?1",
                params![conversation_id, now],
            )?;
            if bumped == 0 {
                return Ok(None);
            }
            let message = tx.query_row(
                "INSERT INTO messages (conversation_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, conversation_id, role, content, created_at",
                params![conversation_id, role.to_string(), content, now],
                message_from_row,
            )?;
            tx.commit()?;
            Ok(Some(message))
        })
        .await
        .map_err(map_tr_err)?;

    inserted.ok_or_else(|| TaskwrightError::conversation_not_found(conversation_id))
}

/// The conversation's messages oldest first, empty unless `owner` owns it.
pub async fn list_messages(
    db: &Database,
    owner: &str,
    conversation_id: i64,
) -> Result<Vec<Message>, TaskwrightError> {
    let owner = owner.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.conversation_id, m.role, m.content, m.created_at
                 FROM messages m
                 JOIN conversations c ON c.id = m.conversation_id
                 WHERE m.conversation_id = ?1 AND c.user_id = ?2
                 ORDER BY m.created_at ASC, m.id ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id, owner], message_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::conversations::{create_conversation, get_conversation};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("messages.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn append_and_list_in_order() {
        let (db, _dir) = setup_db().await;
        let conv = create_conversation(&db, "u1").await.unwrap();

        append_message(&db, conv.id, MessageRole::User, "hello").await.unwrap();
        append_message(&db, conv.id, MessageRole::Assistant, "hi there")
            .await
            .unwrap();
        append_message(&db, conv.id, MessageRole::User, "add milk").await.unwrap();

        let messages = list_messages(&db, "u1", conv.id).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hello", "hi there", "add milk"]);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn append_bumps_updated_at() {
        let (db, _dir) = setup_db().await;
        let conv = create_conversation(&db, "u1").await.unwrap();

        append_message(&db, conv.id, MessageRole::User, "ping").await.unwrap();
        let after = get_conversation(&db, "u1", conv.id).await.unwrap().unwrap();
        assert!(after.updated_at >= conv.updated_at);
        assert!(after.updated_at >= after.created_at);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn updated_at_never_moves_backwards() {
        let (db, _dir) = setup_db().await;
        let conv = create_conversation(&db, "u1").await.unwrap();
        let future = "2999-01-01T00:00:00.000Z";
        let id = conv.id;
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE conversations SET updated_at = ?2 WHERE id = ?1",
                    params![id, future],
                )
            })
            .await
            .map_err(map_tr_err)
            .unwrap();

        append_message(&db, conv.id, MessageRole::User, "later").await.unwrap();
        let after = get_conversation(&db, "u1", conv.id).await.unwrap().unwrap();
        assert_eq!(after.updated_at, future);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn append_to_missing_conversation_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = append_message(&db, 4242, MessageRole::User, "lost")
            .await
            .unwrap_err();
        assert!(matches!(err, TaskwrightError::NotFound { entity: "conversation", .. }));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn oversized_content_is_rejected() {
        let (db, _dir) = setup_db().await;
        let conv = create_conversation(&db, "u1").await.unwrap();
        let err = append_message(&db, conv.id, MessageRole::User, &"m".repeat(10_001))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskwrightError::Validation(_)));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_owner_sees_no_messages() {
        let (db, _dir) = setup_db().await;
        let conv = create_conversation(&db, "u1").await.unwrap();
        append_message(&db, conv.id, MessageRole::User, "private").await.unwrap();

        assert!(list_messages(&db, "u2", conv.id).await.unwrap().is_empty());
        db.close().await.unwrap();
    }
}
