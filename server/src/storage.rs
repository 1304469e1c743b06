//! Todo storage engine.
//!
//! # Design
//! `TodoStorage` is the capability handlers depend on; `InMemoryTodoStorage`
//! is the only implementation. It keeps the whole collection behind a single
//! reader/writer lock: lookups and listings share the lock, while create,
//! update and delete take it exclusively, so no reader ever sees a partially
//! applied mutation. Every value handed out is a clone of the stored entity.
//!
//! The lock is held only for one map operation plus a clone, never across an
//! `.await`, which is why a blocking `parking_lot` lock is used from async
//! handlers.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use thiserror::Error;

use crate::model::{Todo, UpdateTodoRequest};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("todo with ID {0} not found")]
    NotFound(String),

    #[error("todo with ID {0} already exists")]
    DuplicateId(String),

    #[error("storage failure: {0}")]
    Internal(String),
}

pub trait TodoStorage: Send + Sync {
    /// Insert a fully formed todo. Fails if its id is already taken.
    fn create(&self, todo: Todo) -> Result<(), StorageError>;

    fn get_by_id(&self, id: &str) -> Result<Todo, StorageError>;

    /// Every stored todo, in no particular order.
    fn get_all(&self) -> Result<Vec<Todo>, StorageError>;

    /// Apply the fields present in `updates`, bump `updated_at`, and return
    /// the resulting todo.
    fn update(&self, id: &str, updates: &UpdateTodoRequest) -> Result<Todo, StorageError>;

    fn delete(&self, id: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct InMemoryTodoStorage {
    todos: RwLock<HashMap<String, Todo>>,
}

impl InMemoryTodoStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.todos.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.read().is_empty()
    }
}

impl TodoStorage for InMemoryTodoStorage {
    fn create(&self, todo: Todo) -> Result<(), StorageError> {
        let mut todos = self.todos.write();
        if todos.contains_key(&todo.id) {
            return Err(StorageError::DuplicateId(todo.id));
        }
        todos.insert(todo.id.clone(), todo);
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> Result<Todo, StorageError> {
        let todos = self.todos.read();
        todos
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    fn get_all(&self) -> Result<Vec<Todo>, StorageError> {
        let todos = self.todos.read();
        Ok(todos.values().cloned().collect())
    }

    fn update(&self, id: &str, updates: &UpdateTodoRequest) -> Result<Todo, StorageError> {
        let mut todos = self.todos.write();
        let todo = todos
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        if let Some(title) = &updates.title {
            todo.title = title.clone();
        }
        if let Some(description) = &updates.description {
            todo.description = description.clone();
        }
        if let Some(completed) = updates.completed {
            todo.completed = completed;
        }
        todo.updated_at = next_timestamp(todo.updated_at, Utc::now());

        Ok(todo.clone())
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        let mut todos = self.todos.write();
        todos
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }
}

/// `updated_at` must strictly increase even when the wall clock has not
/// advanced (or stepped backwards) since the previous mutation.
fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}
