//! HTTP service for persistent todo records.
//!
//! # Overview
//! `app` builds the axum router over an explicitly constructed
//! [`TodoRepository`]; `run` serves it on a bound listener. The binary in
//! `main.rs` reads [`ServerConfig`], connects the store and calls `run`.
//!
//! # Design
//! - Store adapter (`store`): find/create/save/delete primitives behind the
//!   `TodoStore` trait, with SQLite and in-memory backends.
//! - Repository (`repo`): the five CRUD operations, explicit NotFound, and a
//!   bounded timeout on every store call.
//! - Handlers: id/body parsing and response shaping. Errors become
//!   `{"error": ...}` bodies and never crash the process.

pub mod config;
pub mod error;
mod handlers;
pub mod model;
pub mod repo;
pub mod store;
pub mod telemetry;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use model::{Todo, TodoId, TodoPatch};
pub use repo::{RepoError, TodoRepository};
pub use store::{connect, MemoryStore, SqliteStore, StoreError, TodoStore};

pub fn app(repo: TodoRepository) -> Router {
    Router::new()
        .route("/todos", get(handlers::list_todos).post(handlers::create_todo))
        .route("/todos/", get(handlers::list_todos).post(handlers::create_todo))
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .patch(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(middleware::from_fn(telemetry::request_logging))
        .with_state(repo)
}

pub async fn run(listener: TcpListener, repo: TodoRepository) -> Result<(), std::io::Error> {
    axum::serve(listener, app(repo)).await
}
