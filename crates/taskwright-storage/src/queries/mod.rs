// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.
//!
//! Every function takes the owner identifier and filters on it in SQL.

pub mod conversations;
pub mod messages;
pub mod tasks;

use taskwright_core::TaskwrightError;

pub(crate) const MAX_TITLE_CHARS: usize = 200;
pub(crate) const MAX_DESCRIPTION_CHARS: usize = 1000;
pub(crate) const MAX_CONTENT_CHARS: usize = 10_000;

/// Rejects a value longer than `max` characters.
pub(crate) fn check_length(field: &str, value: &str, max: usize) -> Result<(), TaskwrightError> {
    let len = value.chars().count();
    if len > max {
        return Err(TaskwrightError::Validation(format!(
            "{field} must be at most {max} characters (got {len})"
        )));
    }
    Ok(())
}
