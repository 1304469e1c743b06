//! HTTP-boundary errors.
//!
//! Every failure leaves the server as a `TodoResponse` envelope with
//! `success: false` and a fixed, category-level message. Storage error text is
//! logged by the handler and never reaches the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::TodoResponse;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed body or a missing required field.
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("Todo not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request timed out")]
    Timeout,

    /// Unexpected storage failure, including a duplicate generated id.
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(TodoResponse::error(self.to_string()))).into_response()
    }
}
