//! Store adapter: a thin façade over the backing store.
//!
//! # Design
//! `TodoStore` exposes only find/create/save/delete primitives. Absence is
//! reported explicitly (`Option` / `bool`), never through a zero-valued
//! record. Backends are selected by connection string in [`connect`] and
//! shared across requests as an `Arc<dyn TodoStore>`; each backend is
//! responsible for its own synchronization.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use crate::model::{NewTodo, Todo, TodoId};

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unsupported store url `{0}`")]
    InvalidUrl(String),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },

    #[error("existing `todos` table is incompatible: missing column `{0}`")]
    IncompatibleSchema(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str;

    async fn find_all(&self) -> StoreResult<Vec<Todo>>;

    async fn find(&self, id: TodoId) -> StoreResult<Option<Todo>>;

    /// Inserts a record and returns it with its store-assigned id.
    async fn create(&self, todo: NewTodo) -> StoreResult<Todo>;

    /// Persists every field of `todo`. Returns `false` when no live record has its id.
    async fn save(&self, todo: &Todo) -> StoreResult<bool>;

    /// Removes a live record. Returns `false` when none matched.
    async fn delete(&self, id: TodoId) -> StoreResult<bool>;
}

/// Opens the store named by `url` and brings its schema up to date.
///
/// Recognized forms: `sqlite::memory:`, `sqlite://<path>`, `sqlite:<path>`
/// and `memory://`.
pub fn connect(url: &str) -> StoreResult<Arc<dyn TodoStore>> {
    let started_at = Instant::now();
    let url = url.trim();
    info!(event = "store_connect", status = "start", url = %redact(url));

    let result: StoreResult<Arc<dyn TodoStore>> = if url == "memory://" {
        Ok(Arc::new(MemoryStore::new()))
    } else if url == "sqlite::memory:" {
        SqliteStore::open_in_memory().map(|store| Arc::new(store) as Arc<dyn TodoStore>)
    } else if let Some(path) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .filter(|path| !path.is_empty())
    {
        SqliteStore::open(path).map(|store| Arc::new(store) as Arc<dyn TodoStore>)
    } else {
        Err(StoreError::InvalidUrl(url.to_string()))
    };

    match &result {
        Ok(store) => info!(
            event = "store_connect",
            status = "ok",
            backend = store.backend_tag(),
            duration_ms = started_at.elapsed().as_millis() as u64,
        ),
        Err(err) => error!(
            event = "store_connect",
            status = "error",
            duration_ms = started_at.elapsed().as_millis() as u64,
            error = %err,
        ),
    }
    result
}

// Connection strings may carry credentials in a userinfo part.
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_selects_backend_by_scheme() {
        assert_eq!(connect("memory://").unwrap().backend_tag(), "memory");
        assert_eq!(connect("sqlite::memory:").unwrap().backend_tag(), "sqlite");
    }

    #[test]
    fn connect_rejects_unknown_scheme() {
        let err = connect("postgres://db/todos").err().unwrap();
        assert!(matches!(err, StoreError::InvalidUrl(_)));
        let err = connect("sqlite:").err().unwrap();
        assert!(matches!(err, StoreError::InvalidUrl(_)));
    }

    #[test]
    fn connect_opens_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.db");
        let store = connect(&format!("sqlite://{}", path.display())).unwrap();
        assert_eq!(store.backend_tag(), "sqlite");
        assert!(path.exists());
    }

    #[test]
    fn redact_hides_userinfo() {
        assert_eq!(redact("sqlite://user:pw@host/db"), "sqlite://***@host/db");
        assert_eq!(redact("sqlite::memory:"), "sqlite::memory:");
    }
}
