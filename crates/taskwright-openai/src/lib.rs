// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI oracle adapter for taskwright.
//!
//! Implements [`OracleAdapter`] on top of the Chat Completions API. Each
//! request carries exactly one user message; JSON mode is switched on for
//! intent classification.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use taskwright_config::model::OpenAiConfig;
use taskwright_core::{
    AdapterType, HealthStatus, OracleAdapter, OracleRequest, OracleResponse, PluginAdapter,
    ResponseFormat, TaskwrightError,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatCompletionRequest, ChatMessage, ResponseFormatSpec};

/// OpenAI-backed oracle.
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
pub struct OpenAiOracle {
    client: OpenAiClient,
    model: String,
}

impl OpenAiOracle {
    /// Creates an oracle from the `[openai]` config section.
    pub fn new(config: &OpenAiConfig) -> Result<Self, TaskwrightError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = OpenAiClient::new(
            &api_key,
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )?;

        info!(model = %config.model, endpoint = client.endpoint(), "OpenAI oracle initialized");

        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    /// Wraps an existing client.
    pub fn with_client(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn to_completion_request(&self, request: OracleRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(request.prompt)],
            response_format: match request.format {
                ResponseFormat::JsonObject => Some(ResponseFormatSpec::json_object()),
                ResponseFormat::Text => None,
            },
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiOracle {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Oracle
    }

    async fn health_check(&self) -> Result<HealthStatus, TaskwrightError> {
        // No request is made here; a live probe would spend tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TaskwrightError> {
        debug!("OpenAI oracle shutting down");
        Ok(())
    }
}

#[async_trait]
impl OracleAdapter for OpenAiOracle {
    async fn complete(&self, request: OracleRequest) -> Result<OracleResponse, TaskwrightError> {
        let api_request = self.to_completion_request(request);
        let response = self.client.complete(&api_request).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| TaskwrightError::Oracle {
                message: "completion contained no text".to_string(),
                source: None,
            })?;

        Ok(OracleResponse {
            text,
            model: response.model,
        })
    }
}

/// Resolves the API key from config or the `OPENAI_API_KEY` environment variable.
pub fn resolve_api_key(config_key: Option<&str>) -> Result<String, TaskwrightError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.to_string());
    }

    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            TaskwrightError::Config(
                "OpenAI API key not found. Set openai.api_key in config or the OPENAI_API_KEY environment variable.".into(),
            )
        })
}
