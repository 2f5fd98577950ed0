// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt templates sent to the oracle.

use taskwright_core::{Message, ToolResult};

/// Builds the intent classification prompt for one user message.
pub fn classification_prompt(message: &str) -> String {
    format!(
        r#"Analyze this user message and determine their intent for task management.

Message: "{message}"

Determine the intent and extract relevant entities:
1. If user wants to ADD a task: extract title and optional description
2. If user wants to LIST tasks: determine if they want all, pending, or completed
3. If user wants to COMPLETE a task: extract the task ID or description to identify it
4. If user wants to DELETE a task: extract the task ID or description
5. If user wants to UPDATE a task: extract task ID/description and new title/description
6. If unclear or greeting: indicate clarification needed

Respond with JSON only (no markdown):
{{
    "intent": "add|list|complete|delete|update|clarify|greeting",
    "confidence": 0.0-1.0,
    "entities": {{
        "title": "extracted title or null",
        "description": "extracted description or null",
        "status": "all|pending|completed or null",
        "task_id": "numeric ID if specified or null",
        "task_description": "description to identify task or null"
    }},
    "response": "A brief natural language response if clarification is needed, or null"
}}
"#
    )
}

/// Renders the tail of the conversation as a bullet list.
///
/// Only the last `window` messages are shown, each cut to `truncate_chars`
/// characters. Empty history renders as an empty string.
pub fn history_text(history: &[Message], window: usize, truncate_chars: usize) -> String {
    if history.is_empty() {
        return String::new();
    }
    let start = history.len().saturating_sub(window);
    let mut text = String::from("\nRecent conversation:\n");
    for message in &history[start..] {
        let content: String = message.content.chars().take(truncate_chars).collect();
        text.push_str(&format!("- {}: {}\n", message.role, content));
    }
    text
}

/// Builds the reply generation prompt from the turn's outcome.
pub fn reply_prompt(message: &str, tool_result: &ToolResult, history_text: &str) -> String {
    let result_json = serde_json::to_string_pretty(tool_result)
        .unwrap_or_else(|_| format!("{{\"success\": {}}}", tool_result.success));
    format!(
        r#"The user said: "{message}"

Tool result: {result_json}

{history_text}

Generate a friendly, concise response to the user. Confirm what was done clearly.
If there's an error, explain it helpfully and suggest next steps.

Response:"#
    )
}
