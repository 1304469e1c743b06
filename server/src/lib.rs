//! HTTP todo service backed by a concurrency-safe in-memory store.
//!
//! # Overview
//! - [`storage`]: the `TodoStorage` capability and its in-memory engine.
//! - [`handler`]: request validation, storage calls, status/envelope mapping.
//! - [`model`]: the todo entity and wire DTOs.
//!
//! [`router`] wires the handlers under `/api/v1` plus `/health` behind a
//! per-request timeout; [`run`] serves a router on an already-bound listener
//! with a bounded graceful shutdown.

pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod storage;

use std::{
    future::{Future, IntoFuture},
    io,
    sync::Arc,
    time::Duration,
};

use axum::{error_handling::HandleErrorLayer, http::Method, routing::get, Router};
use tokio::{net::TcpListener, sync::Notify};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub use config::Config;
pub use error::ApiError;
pub use handler::AppState;
pub use model::{
    CreateTodoRequest, HealthResponse, Todo, TodoListResponse, TodoResponse, UpdateTodoRequest,
};
pub use storage::{InMemoryTodoStorage, StorageError, TodoStorage};

/// Upper bound on handling one request, body read included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// How long shutdown waits for in-flight requests before giving up.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoint table, also printed at startup.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/health"),
    ("POST", "/api/v1/todos"),
    ("GET", "/api/v1/todos"),
    ("GET", "/api/v1/todos/{id}"),
    ("PUT", "/api/v1/todos/{id}"),
    ("DELETE", "/api/v1/todos/{id}"),
];

pub fn router(state: AppState) -> Router {
    router_with_timeout(state, REQUEST_TIMEOUT)
}

/// Same routes as [`router`], with a custom per-request deadline. Requests that
/// exceed it get a 408 envelope.
pub fn router_with_timeout(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let timeout = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handler::handle_middleware_error))
        .layer(TimeoutLayer::new(request_timeout));

    let api = Router::new()
        .route(
            "/todos",
            get(handler::list_todos)
                .post(handler::create_todo)
                .fallback(handler::method_not_allowed),
        )
        .route(
            "/todos/{id}",
            get(handler::get_todo)
                .put(handler::update_todo)
                .delete(handler::delete_todo)
                .fallback(handler::method_not_allowed),
        );

    Router::new()
        .route(
            "/health",
            get(handler::health).fallback(handler::method_not_allowed),
        )
        .nest("/api/v1", api)
        .fallback(handler::route_not_found)
        .with_state(state)
        .layer(timeout)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Router over a fresh, empty in-memory store.
pub fn app() -> Router {
    router(AppState::new(Arc::new(InMemoryTodoStorage::new())))
}

/// Serve `router` until `shutdown` resolves, then drain in-flight requests for
/// at most `drain_timeout`. Hitting the deadline is reported as
/// `io::ErrorKind::TimedOut`.
pub async fn run<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
    drain_timeout: Duration,
) -> Result<(), io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let draining = Arc::new(Notify::new());
    let signal = Arc::clone(&draining);
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            signal.notify_one();
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        _ = draining.notified() => {}
    }

    match tokio::time::timeout(drain_timeout, server).await {
        Ok(result) => result,
        Err(_) => {
            warn!(?drain_timeout, "in-flight requests still running, forcing shutdown");
            Err(io::Error::new(io::ErrorKind::TimedOut, "server forced to shut down"))
        }
    }
}
