// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `taskwright shell` and `taskwright chat`.
//!
//! The shell is a readline REPL over one conversation per session; `/new`
//! starts another. `chat` runs a single turn and prints the reply envelope.

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use taskwright_config::TaskwrightConfig;
use taskwright_core::{StorageAdapter, TaskwrightError};
use tracing::debug;

use crate::serve::{build_agent, open_storage};

pub async fn run_shell(config: &TaskwrightConfig, user: &str) -> Result<(), TaskwrightError> {
    let storage = open_storage(config).await?;
    let (agent, _oracle) = build_agent(config, storage.clone())?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| TaskwrightError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "taskwright shell".bold().green());
    println!(
        "Chatting as {}. Type {} for a new conversation, {} to exit.\n",
        user.cyan(),
        "/new".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", "taskwright".green());
    let mut conversation_id: Option<i64> = None;
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if trimmed == "/new" {
                    conversation_id = None;
                    println!("{}", "started a new conversation".dimmed());
                    continue;
                }

                match agent.chat(trimmed, user, conversation_id).await {
                    Ok(reply) => {
                        debug!(
                            conversation_id = reply.conversation_id,
                            intent = %reply.intent,
                            "shell turn complete"
                        );
                        conversation_id = Some(reply.conversation_id);
                        println!("{}\n", reply.response);
                    }
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    storage.close().await
}

pub async fn run_chat(
    config: &TaskwrightConfig,
    user: &str,
    conversation_id: Option<i64>,
    message: &str,
) -> Result<(), TaskwrightError> {
    if message.trim().is_empty() {
        return Err(TaskwrightError::Validation(
            "message must not be empty".to_string(),
        ));
    }
    let storage = open_storage(config).await?;
    let (agent, _oracle) = build_agent(config, storage.clone())?;

    let result = agent.chat(message, user, conversation_id).await;
    storage.close().await?;

    let reply = result?;
    let rendered = serde_json::to_string_pretty(&reply)
        .map_err(|e| TaskwrightError::Internal(format!("failed to render reply: {e}")))?;
    println!("{rendered}");
    Ok(())
}
