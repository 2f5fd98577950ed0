// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from `TaskwrightError` to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use taskwright_core::TaskwrightError;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// A handler error carrying the domain error it came from.
#[derive(Debug)]
pub struct ApiError(pub TaskwrightError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TaskwrightError::Oracle { .. } | TaskwrightError::MalformedIntent { .. } => {
                StatusCode::BAD_GATEWAY
            }
            TaskwrightError::NotFound { .. } => StatusCode::NOT_FOUND,
            TaskwrightError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TaskwrightError::Auth(_) => StatusCode::UNAUTHORIZED,
            TaskwrightError::Config(_)
            | TaskwrightError::Storage { .. }
            | TaskwrightError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TaskwrightError> for ApiError {
    fn from(err: TaskwrightError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
