//! Error types for the todo API client.
//!
//! `NotFound` gets its own variant because callers routinely branch on it.
//! Every other unexpected status lands in `Http` with the server's `error`
//! message when the body carries one.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("todo not found")]
    NotFound,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}
