// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn FSM that handles one chat message end to end.
//!
//! Each turn goes through states:
//! Start -> Classify -> (DirectReply | [Resolve ->] Dispatch -> ReplyGenerate) -> Persist -> End.
//!
//! The agent keeps nothing between turns. Continuity comes from re-reading
//! the conversation's stored messages on every call.

use std::sync::Arc;

use taskwright_config::model::TaskwrightConfig;
use taskwright_core::{
    ChatResponse, Intent, IntentKind, MessageRole, OracleAdapter, OracleRequest, StatusFilter,
    StorageAdapter, TaskwrightError, ToolResult,
};
use tracing::{debug, info, warn};

use crate::classifier::IntentClassifier;
use crate::dispatcher::{ToolCall, ToolDispatcher};
use crate::prompt;
use crate::resolver::{Resolution, TaskResolver};

/// Result carried forward when the intent is not one the agent acts on.
pub const NOT_SURE_MESSAGE: &str =
    "I'm not sure what you want to do. Try asking to add, list, complete, delete, or update a task.";

/// States in the turn FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Conversation resolved, user message persisted.
    Start,
    /// Waiting on the oracle's intent classification.
    Classify,
    /// Greeting or clarify: answering with the oracle's own reply.
    DirectReply,
    /// Turning a task reference into a task id.
    Resolve,
    /// Running a tool against storage.
    Dispatch,
    /// Asking the oracle to phrase the tool result.
    ReplyGenerate,
    /// Appending the assistant reply.
    Persist,
    End,
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnState::Start => write!(f, "start"),
            TurnState::Classify => write!(f, "classify"),
            TurnState::DirectReply => write!(f, "direct_reply"),
            TurnState::Resolve => write!(f, "resolve"),
            TurnState::Dispatch => write!(f, "dispatch"),
            TurnState::ReplyGenerate => write!(f, "reply_generate"),
            TurnState::Persist => write!(f, "persist"),
            TurnState::End => write!(f, "end"),
        }
    }
}

/// Tunables for a turn, taken from `[agent]` and `[openai]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub history_window: usize,
    pub history_truncate_chars: usize,
    pub fallback_greeting: String,
    pub reply_max_tokens: u32,
}

impl AgentSettings {
    pub fn from_config(config: &TaskwrightConfig) -> Self {
        Self {
            history_window: config.agent.history_window,
            history_truncate_chars: config.agent.history_truncate_chars,
            fallback_greeting: config.agent.fallback_greeting.clone(),
            reply_max_tokens: config.openai.reply_max_tokens,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&TaskwrightConfig::default())
    }
}

struct Turn {
    conversation_id: i64,
    state: TurnState,
}

impl Turn {
    fn advance(&mut self, next: TurnState) {
        debug!(
            conversation_id = self.conversation_id,
            from = %self.state,
            to = %next,
            "turn state transition"
        );
        self.state = next;
    }
}

/// The conversational agent.
///
/// Only oracle failures (transport, status, malformed classification) and
/// storage failures outside tool dispatch escape [`TaskAgent::chat`]. Everything
/// else becomes an in-chat explanation.
pub struct TaskAgent {
    storage: Arc<dyn StorageAdapter>,
    oracle: Arc<dyn OracleAdapter>,
    classifier: IntentClassifier,
    resolver: TaskResolver,
    dispatcher: ToolDispatcher,
    settings: AgentSettings,
}

impl TaskAgent {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        oracle: Arc<dyn OracleAdapter>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(oracle.clone()),
            resolver: TaskResolver::new(storage.clone()),
            dispatcher: ToolDispatcher::new(storage.clone()),
            storage,
            oracle,
            settings,
        }
    }

    /// Handles one user message.
    ///
    /// A `conversation_id` that is unknown or owned by someone else is
    /// replaced by a fresh conversation, whose id is returned.
    pub async fn chat(
        &self,
        message: &str,
        owner: &str,
        conversation_id: Option<i64>,
    ) -> Result<ChatResponse, TaskwrightError> {
        let conversation_id = self.resolve_conversation(owner, conversation_id).await?;
        let mut turn = Turn {
            conversation_id,
            state: TurnState::Start,
        };

        let history = self.storage.list_messages(owner, conversation_id).await?;
        self.storage
            .append_message(conversation_id, MessageRole::User, message)
            .await?;

        turn.advance(TurnState::Classify);
        let intent = self.classifier.classify(message).await?;
        info!(owner, conversation_id, intent = %intent.kind, "message classified");

        if intent.kind.is_direct_reply() {
            turn.advance(TurnState::DirectReply);
            let response = intent
                .direct_response
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| self.settings.fallback_greeting.clone());

            turn.advance(TurnState::Persist);
            self.storage
                .append_message(conversation_id, MessageRole::Assistant, &response)
                .await?;
            turn.advance(TurnState::End);
            return Ok(ChatResponse {
                response,
                conversation_id,
                intent: intent.kind,
                tool_result: None,
            });
        }

        let tool_result = self.act(&mut turn, owner, &intent).await;

        turn.advance(TurnState::ReplyGenerate);
        let history_text = prompt::history_text(
            &history,
            self.settings.history_window,
            self.settings.history_truncate_chars,
        );
        let request = OracleRequest::text(prompt::reply_prompt(message, &tool_result, &history_text))
            .with_max_tokens(self.settings.reply_max_tokens);
        let reply = self.oracle.complete(request).await?;
        let response = reply.text.trim().to_string();

        turn.advance(TurnState::Persist);
        self.storage
            .append_message(conversation_id, MessageRole::Assistant, &response)
            .await?;
        turn.advance(TurnState::End);

        Ok(ChatResponse {
            response,
            conversation_id,
            intent: intent.kind,
            tool_result: Some(tool_result),
        })
    }

    async fn resolve_conversation(
        &self,
        owner: &str,
        requested: Option<i64>,
    ) -> Result<i64, TaskwrightError> {
        if let Some(id) = requested
            && let Some(conversation) = self.storage.get_conversation(owner, id).await?
        {
            return Ok(conversation.id);
        }

        let conversation = self.storage.create_conversation(owner).await?;
        if let Some(id) = requested {
            warn!(
                owner,
                requested = id,
                conversation_id = conversation.id,
                "conversation not found, starting a new one"
            );
        }
        Ok(conversation.id)
    }

    /// Turns an actionable intent into a tool result. Never fails.
    async fn act(&self, turn: &mut Turn, owner: &str, intent: &Intent) -> ToolResult {
        let entities = &intent.entities;
        let call = if intent.kind.needs_task_reference() {
            turn.advance(TurnState::Resolve);
            let task_id = match self.resolver.resolve(owner, intent.kind, entities).await {
                Ok(Resolution::Resolved(id)) => Some(id),
                Ok(Resolution::Clarify(message)) => {
                    debug!(owner, intent = %intent.kind, "task reference unresolved");
                    return ToolResult::failure(message);
                }
                Err(e) => {
                    warn!(owner, intent = %intent.kind, error = %e, "task resolution failed");
                    return ToolResult::failure(format!("Error: {e}"));
                }
            };
            match intent.kind {
                IntentKind::Complete => ToolCall::CompleteTask { task_id },
                IntentKind::Delete => ToolCall::DeleteTask { task_id },
                _ => ToolCall::UpdateTask {
                    task_id,
                    title: entities.title.clone(),
                    description: entities.description.clone(),
                },
            }
        } else {
            match intent.kind {
                IntentKind::Add => ToolCall::AddTask {
                    title: entities.title.clone(),
                    description: entities.description.clone(),
                },
                IntentKind::List => ToolCall::ListTasks {
                    status: StatusFilter::from_entity(entities.status.as_deref()),
                },
                _ => return ToolResult::failure(NOT_SURE_MESSAGE),
            }
        };

        turn.advance(TurnState::Dispatch);
        self.dispatcher.dispatch(owner, call).await
    }
}
