// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end chat turns through a real agent, temp SQLite and a scripted oracle.

use serde_json::json;
use taskwright_core::{IntentKind, MessageRole, StatusFilter, TaskwrightError};
use taskwright_test_utils::{TestHarness, direct_reply, intent_reply};

#[tokio::test]
async fn add_then_list_in_one_conversation() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec![
            intent_reply("add", json!({"title": "buy milk"})),
            "Added 'buy milk' to your list.".to_string(),
            intent_reply("list", json!({"status": "all"})),
            "You have one task: buy milk.".to_string(),
        ])
        .build()
        .await
        .unwrap();

    let added = harness.chat("add buy milk", "u1", None).await.unwrap();
    assert_eq!(added.intent, IntentKind::Add);
    assert!(added.tool_result.as_ref().unwrap().success);

    let tasks = harness.storage.list_tasks("u1", StatusFilter::All).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "buy milk");

    let listed = harness
        .chat("what's on my list?", "u1", Some(added.conversation_id))
        .await
        .unwrap();
    assert_eq!(listed.conversation_id, added.conversation_id);
    let result = listed.tool_result.unwrap();
    assert_eq!(result.message, "You have 1 task(s) total:");
    assert_eq!(result.tasks.unwrap()[0].title, "buy milk");

    let messages = harness
        .storage
        .list_messages("u1", added.conversation_id)
        .await
        .unwrap();
    let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
            MessageRole::Assistant
        ]
    );
}

#[tokio::test]
async fn ambiguous_reference_lists_candidates() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec![
            intent_reply("delete", json!({"task_description": "the buy task"})),
            "Which one should I delete?".to_string(),
        ])
        .build()
        .await
        .unwrap();
    let milk = harness.storage.create_task("u1", "Buy milk", None).await.unwrap();
    let bread = harness.storage.create_task("u1", "Buy bread", None).await.unwrap();

    let reply = harness.chat("delete the buy task", "u1", None).await.unwrap();
    assert_eq!(reply.intent, IntentKind::Delete);
    let result = reply.tool_result.unwrap();
    assert!(!result.success);
    assert_eq!(
        result.message,
        format!(
            "I found multiple tasks matching 'the buy task'. Which one?\n- #{}: Buy milk\n- #{}: Buy bread",
            milk.id, bread.id
        )
    );
    assert_eq!(
        harness.storage.list_tasks("u1", StatusFilter::All).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn unknown_conversation_id_starts_fresh() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec![direct_reply("greeting", "Welcome back!")])
        .build()
        .await
        .unwrap();

    let reply = harness.chat("hello again", "u1", Some(9_999)).await.unwrap();
    assert_ne!(reply.conversation_id, 9_999);
    let conversations = harness.storage.list_conversations("u1").await.unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].id, reply.conversation_id);
}

#[tokio::test]
async fn non_json_classification_is_an_error() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["Sure thing, adding it now.".to_string()])
        .build()
        .await
        .unwrap();

    let err = harness.chat("add buy milk", "u1", None).await.unwrap_err();
    assert!(matches!(err, TaskwrightError::MalformedIntent { .. }));
    assert!(
        harness
            .storage
            .list_tasks("u1", StatusFilter::All)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn update_by_id_keeps_title() {
    let harness = TestHarness::builder().build().await.unwrap();
    let task = harness
        .storage
        .create_task("u1", "Call mom", Some("sunday"))
        .await
        .unwrap();
    harness
        .add_oracle_response(intent_reply(
            "update",
            json!({"task_id": task.id, "description": "saturday instead"}),
        ))
        .await;
    harness.add_oracle_response("Updated!").await;

    let reply = harness.chat("move the call to saturday", "u1", None).await.unwrap();
    assert!(reply.tool_result.unwrap().success);

    let stored = harness.storage.get_task("u1", task.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Call mom");
    assert_eq!(stored.description.as_deref(), Some("saturday instead"));
}

#[tokio::test]
async fn owners_are_isolated() {
    let harness = TestHarness::builder().build().await.unwrap();
    let theirs = harness.storage.create_task("u2", "Secret plan", None).await.unwrap();
    harness
        .add_oracle_response(intent_reply("delete", json!({"task_id": theirs.id})))
        .await;
    harness.add_oracle_response("Couldn't find that one.").await;

    let reply = harness.chat("delete task", "u1", None).await.unwrap();
    let result = reply.tool_result.unwrap();
    assert!(!result.success);
    assert_eq!(result.message, format!("Task #{} not found.", theirs.id));
    assert!(harness.storage.get_task("u2", theirs.id).await.unwrap().is_some());
}

#[tokio::test]
async fn history_window_limits_reply_context() {
    let harness = TestHarness::builder()
        .with_history_window(2)
        .with_mock_responses(vec![
            direct_reply("greeting", "first reply"),
            intent_reply("list", json!({})),
            "second reply".to_string(),
        ])
        .build()
        .await
        .unwrap();

    let first = harness.chat("first message", "u1", None).await.unwrap();
    harness
        .chat("second message", "u1", Some(first.conversation_id))
        .await
        .unwrap();

    let prompts = harness.oracle.prompts().await;
    let reply_prompt = prompts.last().unwrap();
    assert!(reply_prompt.contains("- user: first message"));
    assert!(reply_prompt.contains("- assistant: first reply"));
    assert!(!reply_prompt.contains("- user: second message"));
}
