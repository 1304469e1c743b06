//! Todo entity and the request/response DTOs shared by storage and handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single todo item. The storage engine owns the canonical copy; everything
/// outside it works on clones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Build a fresh, not-yet-completed todo stamped with `now` for both
    /// timestamps.
    pub fn new(id: String, title: String, description: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            description,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of `POST /api/v1/todos`.
///
/// A missing `title` deserializes to an empty string so the handler reports it
/// the same way as an explicit `""`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `PUT /api/v1/todos/{id}`. Absent and `null` fields both mean
/// "leave unchanged".
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodoRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// Envelope for single-item operations and for every failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Todo>,
}

impl TodoResponse {
    pub fn ok(message: impl Into<String>, data: Option<Todo>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Envelope for `GET /api/v1/todos`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoListResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<Todo>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "todo-api".to_string(),
        }
    }
}
