//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the todo does not exist" from every other failure. A response that carries
//! the server's envelope with `success: false` becomes `Api`; anything that
//! is not an envelope at all lands in `HttpError` with the raw body.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("todo not found")]
    NotFound,

    /// The server answered with an error envelope.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Unexpected status and a body that is not an envelope.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// A success envelope arrived without the expected `data` payload.
    #[error("response envelope is missing data")]
    MissingData,

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}
