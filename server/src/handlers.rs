//! Request handlers for the `/api/v1` routes.
//!
//! Create and update bodies are taken as raw JSON and run through
//! `todo_core::validation`, so a bad payload yields a 400 listing every
//! offending field. Handlers that mutate an existing todo look it up first
//! and answer 404 before touching the body or the store.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use todo_core::{validate_create, validate_update, TodoItem};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::AppState;

/// Envelope for responses that carry a single todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoResponse {
    pub message: String,
    pub todo: TodoItem,
}

impl TodoResponse {
    fn new(message: &str, todo: TodoItem) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            todo,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    /// Seconds since the service started.
    pub uptime: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Server is up and running".to_string(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: Utc::now().timestamp_millis(),
    })
}

pub async fn hello() -> Json<Value> {
    Json(json!({ "hello": "Hello World" }))
}

pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiError> {
    let Json(payload) = payload?;
    let input = validate_create(&payload)?;
    let todo = state.store.create(TodoItem::new(input)).await?;
    info!(id = %todo.id, "todo created");
    Ok((
        StatusCode::CREATED,
        TodoResponse::new("Todo created successfully", todo),
    ))
}

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<TodoItem>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo = find_existing(&state, &id).await?;
    Ok(TodoResponse::new("Todo found successfully", todo))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TodoResponse>, ApiError> {
    let existing = find_existing(&state, &id).await?;
    let Json(payload) = payload?;
    let changes = validate_update(&payload)?;
    let todo = state.store.update(existing.id, changes).await?;
    info!(id = %todo.id, "todo updated");
    Ok(TodoResponse::new("Todo updated successfully", todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let existing = find_existing(&state, &id).await?;
    state.store.delete(existing.id).await?;
    info!(id = %existing.id, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn complete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let existing = find_existing(&state, &id).await?;
    state.store.complete(existing.id).await?;
    info!(id = %existing.id, "todo completed");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::message("not found")))
}

/// Resolves a path id to a stored todo. Ids that are not UUIDs cannot exist,
/// so they are reported the same way as unknown ones.
async fn find_existing(state: &AppState, raw_id: &str) -> Result<TodoItem, ApiError> {
    let Ok(id) = Uuid::parse_str(raw_id) else {
        debug!(id = raw_id, "malformed todo id");
        return Err(ApiError::NotFound);
    };
    match state.store.get_by_id(id).await? {
        Some(todo) => Ok(todo),
        None => {
            debug!(%id, "todo not found");
            Err(ApiError::NotFound)
        }
    }
}
