// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication adapter trait for bearer credentials.

use async_trait::async_trait;

use crate::error::TaskwrightError;
use crate::traits::adapter::PluginAdapter;
use crate::types::AuthIdentity;

/// Verifies a bearer credential and yields the caller's identity.
#[async_trait]
pub trait AuthAdapter: PluginAdapter {
    /// Returns the identity encoded in `token`, or [`TaskwrightError::Auth`].
    async fn verify(&self, token: &str) -> Result<AuthIdentity, TaskwrightError>;
}
