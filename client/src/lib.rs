//! Synchronous, I/O-free client for the todo service.
//!
//! # Overview
//! Each operation is split into `build_*`, which produces an [`HttpRequest`],
//! and `parse_*`, which consumes the [`HttpResponse`] the caller got back.
//! The caller owns the network round-trip, so the client is deterministic and
//! can sit on top of any HTTP stack.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, Todo, UpdateTodo};
