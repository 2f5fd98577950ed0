// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./taskwright.toml` > `~/.config/taskwright/taskwright.toml`
//! > `/etc/taskwright/taskwright.toml`, with environment variable overrides via the
//! `TASKWRIGHT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TaskwrightConfig;

/// Top-level sections an environment variable may target.
const SECTIONS: &[&str] = &["agent", "openai", "storage", "gateway", "auth"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/taskwright/taskwright.toml` (system-wide)
/// 3. `~/.config/taskwright/taskwright.toml` (user XDG config)
/// 4. `./taskwright.toml` (local directory)
/// 5. `TASKWRIGHT_*` environment variables
pub fn load_config() -> Result<TaskwrightConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TaskwrightConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TaskwrightConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TaskwrightConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TaskwrightConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TaskwrightConfig::default()))
        .merge(Toml::file("/etc/taskwright/taskwright.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("taskwright/taskwright.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("taskwright.toml"))
        .merge(env_provider())
}

/// Maps a prefix-stripped env key onto a dotted config path.
///
/// Matching is case-insensitive and the result is lowercased; figment hands
/// over keys in their original case (`GATEWAY_PORT`).
///
/// Only the first underscore after the section name becomes a dot, so
/// `openai_api_key` maps to `openai.api_key` and not `openai.api.key`.
/// Returns `None` for keys outside every known section.
pub fn map_env_key(key: &str) -> Option<String> {
    let key = key.to_ascii_lowercase();
    SECTIONS.iter().find_map(|section| {
        key.strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|field| !field.is_empty())
            .map(|field| format!("{section}.{field}"))
    })
}

/// Environment provider with explicit section mapping.
///
/// Keys that name no section (for example `TASKWRIGHT_JWT_SECRET`, read
/// directly by the auth crate) are filtered out so they never trip
/// `deny_unknown_fields` at the top level.
fn env_provider() -> Env {
    Env::prefixed("TASKWRIGHT_")
        .filter(|key| map_env_key(key.as_str()).is_some())
        .map(|key| {
            map_env_key(key.as_str())
                .unwrap_or_else(|| key.as_str().to_string())
                .into()
        })
}
