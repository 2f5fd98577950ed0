// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Oracle adapter trait for the language model behind intent classification
//! and reply generation.

use async_trait::async_trait;

use crate::error::TaskwrightError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{OracleRequest, OracleResponse};

/// A prompt-in, text-out language model.
///
/// Implementations report transport, status and empty-reply failures as
/// [`TaskwrightError::Oracle`].
#[async_trait]
pub trait OracleAdapter: PluginAdapter {
    /// Sends one prompt and returns the model's text.
    async fn complete(&self, request: OracleRequest) -> Result<OracleResponse, TaskwrightError>;
}
