// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests across every surface sharing one store.
//!
//! The chat agent, the HTTP gateway and the MCP server all run against the
//! same TestHarness database; writes through one must be visible through
//! the others.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use taskwright_auth_jwt::JwtAuth;
use taskwright_core::{IntentKind, MessageRole, StatusFilter};
use taskwright_gateway::{GatewayState, build_router};
use taskwright_mcp_server::McpServer;
use taskwright_test_utils::{TestHarness, direct_reply, intent_reply};
use tower::ServiceExt;

async fn mcp_call(server: &mut McpServer, name: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    });
    let response = server.handle_line(&request.to_string()).await.unwrap();
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

async fn mcp_server(harness: &TestHarness) -> McpServer {
    let mut server = McpServer::new(harness.storage.clone(), "taskwright").unwrap();
    server
        .handle_line(r#"{"jsonrpc":"2.0","id":0,"method":"initialize"}"#)
        .await;
    server
        .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;
    server
}

#[tokio::test]
async fn chat_then_mcp_then_http() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec![
            intent_reply("add", json!({"title": "Buy milk", "description": "2 litres"})),
            "Added Buy milk.".to_string(),
        ])
        .build()
        .await
        .unwrap();

    let reply = harness.chat("add buy milk, 2 litres", "alice", None).await.unwrap();
    assert_eq!(reply.intent, IntentKind::Add);
    assert_eq!(reply.response, "Added Buy milk.");
    let task_id = reply.tool_result.unwrap().task.unwrap().id;

    let mut mcp = mcp_server(&harness).await;
    let completed = mcp_call(
        &mut mcp,
        "complete_task",
        json!({"user_id": "alice", "task_id": task_id}),
    )
    .await;
    assert_eq!(completed["success"], true);
    assert_eq!(completed["task"]["completed"], true);

    let auth = Arc::new(JwtAuth::new("e2e-secret", 1).unwrap());
    let app = build_router(GatewayState {
        agent: harness.agent.clone(),
        storage: harness.storage.clone(),
        oracle: harness.oracle.clone(),
        auth: auth.clone(),
    });
    let response = app
        .oneshot(
            Request::get("/api/tasks?status=completed")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", auth.issue("alice", None).unwrap()),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let tasks: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(tasks[0]["id"], task_id);
    assert_eq!(tasks[0]["description"], "2 litres");
}

#[tokio::test]
async fn conversation_by_reference() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec![
            direct_reply("greeting", "Hi! What should we get done today?"),
            intent_reply("complete", json!({"task_description": "groceries"})),
            "Nice, groceries are done.".to_string(),
            intent_reply("list", json!({"status": "pending"})),
            "Only the report is left.".to_string(),
        ])
        .build()
        .await
        .unwrap();
    harness
        .storage
        .create_task("bob", "Buy groceries", None)
        .await
        .unwrap();
    harness
        .storage
        .create_task("bob", "Write report", None)
        .await
        .unwrap();

    let hello = harness.chat("hello", "bob", None).await.unwrap();
    assert!(hello.tool_result.is_none());
    let conversation = Some(hello.conversation_id);

    let done = harness
        .chat("I finished the groceries", "bob", conversation)
        .await
        .unwrap();
    assert_eq!(done.conversation_id, hello.conversation_id);
    assert!(done.tool_result.unwrap().success);

    let listed = harness
        .chat("what's left?", "bob", conversation)
        .await
        .unwrap();
    let tasks = listed.tool_result.unwrap().tasks.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Write report");

    let pending = harness
        .storage
        .list_tasks("bob", StatusFilter::Pending)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);

    let messages = harness
        .storage
        .list_messages("bob", hello.conversation_id)
        .await
        .unwrap();
    assert_eq!(messages.len(), 6);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[5].content, "Only the report is left.");

    // The third turn's reply prompt carries the earlier exchange.
    let prompts = harness.oracle.prompts().await;
    assert!(prompts.last().unwrap().contains("I finished the groceries"));
}
