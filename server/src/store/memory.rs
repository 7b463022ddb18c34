//! In-process store used by tests and `memory://` deployments.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreResult, TodoStore};
use crate::model::{NewTodo, Todo, TodoId};

#[derive(Default)]
struct Inner {
    next_id: TodoId,
    todos: BTreeMap<TodoId, Todo>,
}

/// Ids start at 1 and only ever grow, so a deleted id is never handed out again.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn find_all(&self) -> StoreResult<Vec<Todo>> {
        let inner = self.inner.read().await;
        Ok(inner.todos.values().cloned().collect())
    }

    async fn find(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let inner = self.inner.read().await;
        Ok(inner.todos.get(&id).cloned())
    }

    async fn create(&self, todo: NewTodo) -> StoreResult<Todo> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let todo = Todo {
            id: inner.next_id,
            name: todo.name,
            completed: false,
        };
        inner.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn save(&self, todo: &Todo) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.todos.get_mut(&todo.id) {
            Some(stored) => {
                *stored = todo.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: TodoId) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.todos.remove(&id).is_some())
    }
}
