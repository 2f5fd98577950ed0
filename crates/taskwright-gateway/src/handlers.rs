// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the REST API.
//!
//! Every authenticated handler reads the caller's `AuthIdentity` from the
//! request extensions and scopes storage calls by its `user_id`.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use taskwright_core::{
    AuthIdentity, ChatResponse, Conversation, HealthStatus, Message, StatusFilter, Task,
    TaskwrightError,
};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub oracle: String,
}

/// Query string for GET /api/tasks.
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// Request body for POST /api/tasks.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for PUT /api/tasks/{id}. Absent fields keep their values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response body for DELETE /api/tasks/{id}.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<i64>,
}

fn health_of(check: Result<HealthStatus, TaskwrightError>) -> HealthStatus {
    check.unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()))
}

/// GET /health
///
/// Unauthenticated. 503 when storage is not healthy.
pub async fn get_health(State(state): State<GatewayState>) -> impl IntoResponse {
    let storage = health_of(state.storage.health_check().await);
    let oracle = health_of(state.oracle.health_check().await);

    let overall = match (&storage, &oracle) {
        (HealthStatus::Healthy, HealthStatus::Healthy) => "healthy",
        (HealthStatus::Unhealthy(_), _) => "unhealthy",
        _ => "degraded",
    };
    let code = if overall == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        code,
        Json(HealthResponse {
            status: overall.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            storage: storage.label().to_string(),
            oracle: oracle.label().to_string(),
        }),
    )
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let filter = StatusFilter::from_entity(query.status.as_deref());
    let tasks = state.storage.list_tasks(&identity.user_id, filter).await?;
    Ok(Json(tasks))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state
        .storage
        .create_task(&identity.user_id, &body.title, body.description.as_deref())
        .await?;
    tracing::info!(owner = %identity.user_id, task_id = task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    state
        .storage
        .get_task(&identity.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| TaskwrightError::task_not_found(id).into())
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let owner = identity.user_id.as_str();
    let existing = state
        .storage
        .get_task(owner, id)
        .await?
        .ok_or_else(|| TaskwrightError::task_not_found(id))?;

    let (title, description) =
        existing.merge_edit(body.title.as_deref(), body.description.as_deref());

    state
        .storage
        .update_task(owner, id, &title, description.as_deref())
        .await?
        .map(Json)
        .ok_or_else(|| TaskwrightError::task_not_found(id).into())
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if !state.storage.delete_task(&identity.user_id, id).await? {
        return Err(TaskwrightError::task_not_found(id).into());
    }
    Ok(Json(DeleteResponse {
        message: format!("Task {id} deleted"),
    }))
}

/// PATCH /api/tasks/{id}/toggle
pub async fn toggle_task(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    state
        .storage
        .toggle_completion(&identity.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| TaskwrightError::task_not_found(id).into())
}

/// POST /api/chat
///
/// Runs one agent turn. Oracle failures surface as 502.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if body.message.trim().is_empty() {
        return Err(TaskwrightError::Validation("message must not be empty".to_string()).into());
    }
    let reply = state
        .agent
        .chat(&body.message, &identity.user_id, body.conversation_id)
        .await?;
    Ok(Json(reply))
}

/// GET /api/conversations
pub async fn list_conversations(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    Ok(Json(
        state.storage.list_conversations(&identity.user_id).await?,
    ))
}

/// GET /api/conversations/{id}/messages
pub async fn list_messages(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let owner = identity.user_id.as_str();
    if state.storage.get_conversation(owner, id).await?.is_none() {
        return Err(TaskwrightError::conversation_not_found(id).into());
    }
    Ok(Json(state.storage.list_messages(owner, id).await?))
}
