//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`, unwraps the server's `{success, message, data}`
//! envelope, and returns the payload.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Envelope, ListEnvelope, Todo, UpdateTodo};

const API_PREFIX: &str = "/api/v1";

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn todos_url(&self) -> String {
        format!("{}{API_PREFIX}/todos", self.base_url)
    }

    fn todo_url(&self, id: &str) -> String {
        format!("{}{API_PREFIX}/todos/{id}", self.base_url)
    }

    pub fn build_health(&self) -> HttpRequest {
        HttpRequest::bodiless(HttpMethod::Get, format!("{}/health", self.base_url))
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest::bodiless(HttpMethod::Get, self.todos_url())
    }

    pub fn build_get_todo(&self, id: &str) -> HttpRequest {
        HttpRequest::bodiless(HttpMethod::Get, self.todo_url(id))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::json(
            HttpMethod::Post,
            self.todos_url(),
            to_json(input)?,
        ))
    }

    pub fn build_update_todo(
        &self,
        id: &str,
        input: &UpdateTodo,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::json(
            HttpMethod::Put,
            self.todo_url(id),
            to_json(input)?,
        ))
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        HttpRequest::bodiless(HttpMethod::Delete, self.todo_url(id))
    }

    /// Only the status matters; the health payload is informational.
    pub fn parse_health(&self, response: HttpResponse) -> Result<(), ApiError> {
        if response.status == 200 {
            return Ok(());
        }
        Err(ApiError::HttpError {
            status: response.status,
            body: response.body,
        })
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        let envelope: ListEnvelope = expect_envelope(&response, 200)?;
        if !envelope.success {
            return Err(api_error(response.status, envelope.message));
        }
        if envelope.total != envelope.data.len() {
            return Err(ApiError::DeserializationError(format!(
                "list total {} does not match {} returned todos",
                envelope.total,
                envelope.data.len()
            )));
        }
        Ok(envelope.data)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_single(&response, 200)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_single(&response, 201)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_single(&response, 200)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        let envelope: Envelope = expect_envelope(&response, 200)?;
        if !envelope.success {
            return Err(api_error(response.status, envelope.message));
        }
        Ok(())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn api_error(status: u16, message: String) -> ApiError {
    ApiError::Api { status, message }
}

fn parse_single(response: &HttpResponse, expected: u16) -> Result<Todo, ApiError> {
    let envelope: Envelope = expect_envelope(response, expected)?;
    if !envelope.success {
        return Err(api_error(response.status, envelope.message));
    }
    envelope.data.ok_or(ApiError::MissingData)
}

/// Decode the body as `T` when the status is the expected one; otherwise map
/// the status (and error envelope, if any) to the matching `ApiError`.
fn expect_envelope<T: DeserializeOwned>(
    response: &HttpResponse,
    expected: u16,
) -> Result<T, ApiError> {
    if response.status == expected {
        return serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()));
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    match serde_json::from_str::<Envelope>(&response.body) {
        Ok(envelope) => Err(api_error(response.status, envelope.message)),
        Err(_) => Err(ApiError::HttpError {
            status: response.status,
            body: response.body.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODO_JSON: &str = r#"{
        "id": "todo_1",
        "title": "Test",
        "description": "",
        "completed": false,
        "created_at": "2024-05-01T12:00:00Z",
        "updated_at": "2024-05-01T12:00:00Z"
    }"#;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:8080")
    }

    fn envelope(message: &str) -> String {
        format!(r#"{{"success":true,"message":"{message}","data":{TODO_JSON}}}"#)
    }

    fn list_envelope(total: usize) -> String {
        let todo: serde_json::Value = serde_json::from_str(TODO_JSON).unwrap();
        serde_json::json!({
            "success": true,
            "message": "Todos retrieved successfully",
            "data": [todo],
            "total": total,
        })
        .to_string()
    }

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8080/api/v1/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_todo_produces_correct_request() {
        let req = client().build_get_todo("todo_42");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8080/api/v1/todos/todo_42");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_health_targets_root_path() {
        let req = client().build_health();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8080/health");
    }

    #[test]
    fn build_create_todo_produces_correct_request() {
        let input = CreateTodo {
            title: "Buy milk".to_string(),
            description: "Semi-skimmed".to_string(),
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/api/v1/todos");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["description"], "Semi-skimmed");
    }

    #[test]
    fn build_update_todo_omits_absent_fields() {
        let input = UpdateTodo {
            completed: Some(true),
            ..Default::default()
        };
        let req = client().build_update_todo("todo_1", &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"completed": true}));
    }

    #[test]
    fn build_delete_todo_produces_correct_request() {
        let req = client().build_delete_todo("todo_1");
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_list_todos_success() {
        let body = list_envelope(1);
        let todos = client().parse_list_todos(HttpResponse::new(200, body)).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Test");
    }

    #[test]
    fn parse_list_todos_rejects_total_mismatch() {
        let body = list_envelope(3);
        let err = client()
            .parse_list_todos(HttpResponse::new(200, body))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(msg) if msg.contains("total 3")));
    }

    #[test]
    fn parse_get_todo_not_found() {
        let body = r#"{"success":false,"message":"Todo not found"}"#;
        let err = client().parse_get_todo(HttpResponse::new(404, body)).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_create_todo_success() {
        let todo = client()
            .parse_create_todo(HttpResponse::new(
                201,
                envelope("Todo created successfully"),
            ))
            .unwrap();
        assert_eq!(todo.id, "todo_1");
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[test]
    fn parse_create_todo_error_envelope() {
        let body = r#"{"success":false,"message":"Title is required"}"#;
        let err = client()
            .parse_create_todo(HttpResponse::new(400, body))
            .unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Title is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_create_todo_non_envelope_failure() {
        let err = client()
            .parse_create_todo(HttpResponse::new(502, "bad gateway"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 502, .. }));
    }

    #[test]
    fn parse_update_todo_missing_data() {
        let body = r#"{"success":true,"message":"Todo updated successfully"}"#;
        let err = client()
            .parse_update_todo(HttpResponse::new(200, body))
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingData));
    }

    #[test]
    fn parse_delete_todo_success() {
        let body = r#"{"success":true,"message":"Todo deleted successfully"}"#;
        assert!(client().parse_delete_todo(HttpResponse::new(200, body)).is_ok());
    }

    #[test]
    fn parse_health_rejects_non_200() {
        assert!(client().parse_health(HttpResponse::new(200, "{}")).is_ok());
        let err = client()
            .parse_health(HttpResponse::new(503, ""))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 503, .. }));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:8080/");
        let req = client.build_list_todos();
        assert_eq!(req.path, "http://localhost:8080/api/v1/todos");
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client()
            .parse_list_todos(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
