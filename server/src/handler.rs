//! Request handlers: parse and validate input, call the storage engine, and
//! map the outcome onto a status code and response envelope.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    BoxError, Json,
};
use chrono::Utc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{
    CreateTodoRequest, HealthResponse, Todo, TodoListResponse, TodoResponse, UpdateTodoRequest,
};
use crate::storage::{StorageError, TodoStorage};

/// Shared handler state. The storage backend is injected so tests can swap in
/// doubles or isolated instances.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn TodoStorage>,
}

impl AppState {
    pub fn new(storage: Arc<dyn TodoStorage>) -> Self {
        Self { storage }
    }
}

/// `todo_` followed by a UUIDv7: millisecond timestamp, a per-process
/// monotonic counter, and random bits.
pub fn generate_id() -> String {
    format!("todo_{}", Uuid::now_v7().simple())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!(%rejection, "rejected create body");
        ApiError::BadRequest("Invalid request body")
    })?;

    if req.title.is_empty() {
        return Err(ApiError::BadRequest("Title is required"));
    }

    let todo = Todo::new(generate_id(), req.title, req.description, Utc::now());
    state.storage.create(todo.clone()).map_err(|e| {
        error!(error = %e, "failed to create todo");
        ApiError::Internal("Failed to create todo")
    })?;

    debug!(id = %todo.id, "todo created");
    Ok((
        StatusCode::CREATED,
        Json(TodoResponse::ok("Todo created successfully", Some(todo))),
    ))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo = state.storage.get_by_id(&id).map_err(not_found_or_internal)?;
    Ok(Json(TodoResponse::ok(
        "Todo retrieved successfully",
        Some(todo),
    )))
}

pub async fn list_todos(
    State(state): State<AppState>,
) -> Result<Json<TodoListResponse>, ApiError> {
    let todos = state.storage.get_all().map_err(|e| {
        error!(error = %e, "failed to list todos");
        ApiError::Internal("Failed to retrieve todos")
    })?;

    Ok(Json(TodoListResponse {
        success: true,
        message: "Todos retrieved successfully".to_string(),
        total: todos.len(),
        data: todos,
    }))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<TodoResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!(%rejection, "rejected update body");
        ApiError::BadRequest("Invalid request body")
    })?;

    // Validated before the lookup: an empty title is a 400 even for an unknown id.
    if req.title.as_deref() == Some("") {
        return Err(ApiError::BadRequest("Title cannot be empty"));
    }
    if req.is_empty() {
        debug!(%id, "update carries no fields, only updated_at changes");
    }

    let todo = state
        .storage
        .update(&id, &req)
        .map_err(not_found_or_internal)?;
    Ok(Json(TodoResponse::ok("Todo updated successfully", Some(todo))))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoResponse>, ApiError> {
    state.storage.delete(&id).map_err(not_found_or_internal)?;
    debug!(%id, "todo deleted");
    Ok(Json(TodoResponse::ok("Todo deleted successfully", None)))
}

/// Unknown paths.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound
}

/// Known path, unsupported verb.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Converts errors from the timeout middleware into an envelope.
pub async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        warn!("request timed out");
        ApiError::Timeout
    } else {
        error!(error = %err, "unhandled middleware error");
        ApiError::Internal("Internal server error")
    }
}

fn not_found_or_internal(err: StorageError) -> ApiError {
    match err {
        StorageError::NotFound(_) => ApiError::NotFound,
        other => {
            error!(error = %other, "storage failure");
            ApiError::Internal("Internal server error")
        }
    }
}
