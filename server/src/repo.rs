//! Todo repository: the five CRUD operations built on a [`TodoStore`].
//!
//! # Design
//! The repository is constructed explicitly with its store and injected into
//! the router state; there is no process-global handle. Every store call is
//! bounded by `store_timeout`. When the timeout fires, or the request future
//! is dropped because the client went away, the pending store future is
//! dropped with it. Absence is always an explicit `RepoError::NotFound`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::model::{NewTodo, Todo, TodoId, TodoPatch};
use crate::store::{StoreError, StoreResult, TodoStore};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("todo not found: {0}")]
    NotFound(TodoId),

    #[error("{0}")]
    Validation(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct TodoRepository {
    store: Arc<dyn TodoStore>,
    store_timeout: Duration,
}

impl TodoRepository {
    pub fn new(store: Arc<dyn TodoStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    pub fn backend_tag(&self) -> &'static str {
        self.store.backend_tag()
    }

    pub async fn list_all(&self) -> RepoResult<Vec<Todo>> {
        self.bounded("find_all", self.store.find_all()).await
    }

    pub async fn get_by_id(&self, id: TodoId) -> RepoResult<Todo> {
        self.bounded("find", self.store.find(id))
            .await?
            .ok_or(RepoError::NotFound(id))
    }

    pub async fn create(&self, name: impl Into<String>) -> RepoResult<Todo> {
        let todo = NewTodo::new(name).map_err(RepoError::Validation)?;
        self.bounded("create", self.store.create(todo)).await
    }

    /// Applies `patch` to the stored record. Fields the patch leaves unset keep
    /// their stored values.
    pub async fn update(&self, id: TodoId, patch: TodoPatch) -> RepoResult<Todo> {
        let mut todo = self.get_by_id(id).await?;
        if patch.is_empty() {
            return Ok(todo);
        }

        patch.apply_to(&mut todo);
        // A concurrent delete between load and save surfaces as NotFound.
        if !self.bounded("save", self.store.save(&todo)).await? {
            return Err(RepoError::NotFound(id));
        }
        Ok(todo)
    }

    pub async fn delete(&self, id: TodoId) -> RepoResult<()> {
        if self.bounded("delete", self.store.delete(id)).await? {
            Ok(())
        } else {
            Err(RepoError::NotFound(id))
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StoreResult<T>>,
    ) -> RepoResult<T> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result.map_err(RepoError::from),
            Err(_) => {
                warn!(
                    event = "store_timeout",
                    operation,
                    backend = self.store.backend_tag(),
                    timeout_ms = self.store_timeout.as_millis() as u64,
                );
                Err(RepoError::Timeout(self.store_timeout))
            }
        }
    }
}
