// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Protocol-level tests over an in-memory transport.

use serde_json::{Value, json};
use taskwright_core::StatusFilter;
use taskwright_mcp_server::McpServer;
use taskwright_test_utils::TestHarness;

async fn server() -> (McpServer, TestHarness) {
    let harness = TestHarness::builder().build().await.unwrap();
    let server = McpServer::new(harness.storage.clone(), "taskwright").unwrap();
    (server, harness)
}

async fn initialized() -> (McpServer, TestHarness) {
    let (mut server, harness) = server().await;
    server
        .handle_line(r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{}}"#)
        .await
        .unwrap();
    assert!(
        server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none()
    );
    (server, harness)
}

async fn call_tool(server: &mut McpServer, name: &str, arguments: Value) -> (bool, Value) {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    });
    let response = server.handle_line(&request.to_string()).await.unwrap();
    let result = &response["result"];
    let text = result["content"][0]["text"].as_str().unwrap();
    (
        result["isError"].as_bool().unwrap(),
        serde_json::from_str(text).unwrap(),
    )
}

#[tokio::test]
async fn initialize_handshake() {
    let (mut server, _harness) = server().await;

    let response = server
        .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
        .await
        .unwrap();
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(response["result"]["serverInfo"]["name"], "taskwright");
    assert!(response["result"]["capabilities"]["tools"].is_object());

    let early = server
        .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
        .await
        .unwrap();
    assert_eq!(early["error"]["code"], -32002);

    server
        .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;
    assert!(server.is_initialized());

    let pong = server
        .handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#)
        .await
        .unwrap();
    assert_eq!(pong["result"], json!({}));
}

#[tokio::test]
async fn notifications_before_initialize_get_no_reply() {
    let (mut server, _harness) = server().await;

    for line in [
        r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{"requestId":1}}"#,
        r#"{"jsonrpc":"2.0","method":"tools/list"}"#,
    ] {
        assert!(server.handle_line(line).await.is_none(), "{line}");
    }
    assert!(!server.is_initialized());

    let early = server
        .handle_line(r#"{"jsonrpc":"2.0","id":5,"method":"tools/list"}"#)
        .await
        .unwrap();
    assert_eq!(early["error"]["code"], -32002);
}

#[tokio::test]
async fn malformed_and_unknown_requests() {
    let (mut server, _harness) = initialized().await;

    let parse = server.handle_line("{not json").await.unwrap();
    assert_eq!(parse["error"]["code"], -32700);
    assert!(parse["id"].is_null());

    let invalid = server.handle_line("[1,2,3]").await.unwrap();
    assert_eq!(invalid["error"]["code"], -32600);

    let unknown = server
        .handle_line(r#"{"jsonrpc":"2.0","id":9,"method":"resources/subscribe"}"#)
        .await
        .unwrap();
    assert_eq!(unknown["error"]["code"], -32601);
    assert_eq!(unknown["id"], 9);

    let bad_params = server
        .handle_line(r#"{"jsonrpc":"2.0","id":10,"method":"tools/call","params":[]}"#)
        .await
        .unwrap();
    assert_eq!(bad_params["error"]["code"], -32602);
}

#[tokio::test]
async fn lists_five_tools_requiring_user_id() {
    let (mut server, _harness) = initialized().await;
    let response = server
        .handle_line(r#"{"jsonrpc":"2.0","id":4,"method":"tools/list"}"#)
        .await
        .unwrap();
    let tools = response["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 5);
    for tool in tools {
        let required = tool["inputSchema"]["required"].as_array().unwrap();
        assert!(required.contains(&json!("user_id")), "{}", tool["name"]);
    }
}

#[tokio::test]
async fn tool_calls_reach_storage() {
    let (mut server, harness) = initialized().await;

    let (is_error, added) = call_tool(
        &mut server,
        "add_task",
        json!({"user_id": "u1", "title": "Say \"hi\" {to} everyone"}),
    )
    .await;
    assert!(!is_error);
    assert_eq!(added["task"]["title"], "Say \"hi\" {to} everyone");
    let id = added["task"]["id"].as_i64().unwrap();

    let (_, listed) = call_tool(&mut server, "list_tasks", json!({"user_id": "u1"})).await;
    assert_eq!(listed["message"], "You have 1 task(s) total:");

    let (is_error, completed) =
        call_tool(&mut server, "complete_task", json!({"user_id": "u1", "task_id": id})).await;
    assert!(!is_error);
    assert_eq!(completed["task"]["completed"], true);

    let (is_error, missing) =
        call_tool(&mut server, "delete_task", json!({"user_id": "u2", "task_id": id})).await;
    assert!(is_error);
    assert_eq!(missing["message"], format!("Task {id} not found."));

    let tasks = harness.storage.list_tasks("u1", StatusFilter::Completed).await.unwrap();
    assert_eq!(tasks.len(), 1);
}

#[tokio::test]
async fn schema_violations_are_tool_errors() {
    let (mut server, harness) = initialized().await;

    let (is_error, result) = call_tool(&mut server, "add_task", json!({"title": "No owner"})).await;
    assert!(is_error);
    assert!(result["message"].as_str().unwrap().starts_with("Invalid arguments:"));

    let (is_error, _) = call_tool(
        &mut server,
        "complete_task",
        json!({"user_id": "u1", "task_id": "seven"}),
    )
    .await;
    assert!(is_error);

    let (is_error, result) = call_tool(&mut server, "rename_task", json!({"user_id": "u1"})).await;
    assert!(is_error);
    assert_eq!(result["message"], "Unknown tool: rename_task");

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
async fn serve_reads_lines_and_writes_responses() {
    let (mut server, _harness) = server().await;
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
        "\n"
    );
    let mut output: Vec<u8> = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["id"], 2);
}
