//! Wire DTOs for the todo API.
//!
//! # Design
//! These mirror the server's schema but are defined independently so the
//! client carries no web-framework dependencies. The workspace integration
//! test catches any schema drift between the two crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Envelope wrapping every single-item response and every error.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub data: Option<Todo>,
}

/// Envelope returned by the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub data: Vec<Todo>,
    #[serde(default)]
    pub total: usize,
}
