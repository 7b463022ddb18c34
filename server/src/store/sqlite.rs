//! SQLite-backed store.
//!
//! # Invariants
//! - One connection for the process lifetime, serialized behind a mutex.
//! - Blocking SQLite calls never run on an async worker thread.
//! - Soft-deleted rows (`deleted_at IS NOT NULL`) are invisible to every read.
//! - Ids come from `AUTOINCREMENT` and are never reused, even after deletes.
//! - Every operation runs in its own transaction and commits only while the
//!   caller is still waiting. A caller that timed out or disconnected leaves
//!   nothing behind.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::oneshot;

use super::migrations::apply_migrations;
use super::{StoreError, StoreResult, TodoStore};
use crate::model::{NewTodo, Todo, TodoId};

const TODO_SELECT_SQL: &str = "SELECT id, name, completed FROM todos WHERE deleted_at IS NULL";
const NOW_MS_SQL: &str = "(strftime('%s', 'now') * 1000)";

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (creating if needed) a database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::bootstrap(Connection::open(path)?)
    }

    /// Opens a private in-memory database and applies migrations.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(mut conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        // Dropping this future drops `_waiting`, which closes `caller`.
        let (caller, _waiting) = oneshot::channel::<()>();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            run_cancellable(&mut guard, &caller, op)
        })
        .await
        .map_err(|err| StoreError::Unavailable(format!("store worker failed: {err}")))?
    }
}

/// Runs `op` in a transaction that commits only if `caller` is still open.
fn run_cancellable<T>(
    conn: &mut Connection,
    caller: &oneshot::Sender<()>,
    op: impl FnOnce(&Connection) -> StoreResult<T>,
) -> StoreResult<T> {
    if caller.is_closed() {
        return Err(cancelled());
    }
    let tx = conn.transaction()?;
    let value = op(&*tx)?;
    if caller.is_closed() {
        // `tx` rolls back on drop.
        return Err(cancelled());
    }
    tx.commit()?;
    Ok(value)
}

fn cancelled() -> StoreError {
    StoreError::Unavailable("cancelled".to_string())
}

#[async_trait]
impl TodoStore for SqliteStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn find_all(&self) -> StoreResult<Vec<Todo>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{TODO_SELECT_SQL} ORDER BY id;"))?;
            let todos = stmt
                .query_map([], parse_todo_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(todos)
        })
        .await
    }

    async fn find(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        self.with_conn(move |conn| {
            let todo = conn
                .query_row(
                    &format!("{TODO_SELECT_SQL} AND id = ?1;"),
                    params![id],
                    parse_todo_row,
                )
                .optional()?;
            Ok(todo)
        })
        .await
    }

    async fn create(&self, todo: NewTodo) -> StoreResult<Todo> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO todos (name, completed) VALUES (?1, 0);",
                params![todo.name.as_str()],
            )?;
            Ok(Todo {
                id: conn.last_insert_rowid(),
                name: todo.name,
                completed: false,
            })
        })
        .await
    }

    async fn save(&self, todo: &Todo) -> StoreResult<bool> {
        let todo = todo.clone();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE todos
                     SET name = ?1, completed = ?2, updated_at = {NOW_MS_SQL}
                     WHERE id = ?3 AND deleted_at IS NULL;"
                ),
                params![todo.name.as_str(), todo.completed, todo.id],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete(&self, id: TodoId) -> StoreResult<bool> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE todos
                     SET deleted_at = {NOW_MS_SQL}, updated_at = {NOW_MS_SQL}
                     WHERE id = ?1 AND deleted_at IS NULL;"
                ),
                params![id],
            )?;
            Ok(changed > 0)
        })
        .await
    }
}

fn parse_todo_row(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        name: row.get(1)?,
        completed: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[tokio::test]
    async fn create_then_find_returns_incomplete_record() {
        let store = store();
        let created = store.create(NewTodo::new("buy milk").unwrap()).await.unwrap();
        assert!(!created.completed);

        let found = store.find(created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn find_missing_is_none() {
        assert_eq!(store().find(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn find_all_on_empty_store_is_empty() {
        assert!(store().find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_persists_all_fields() {
        let store = store();
        let mut todo = store.create(NewTodo::new("walk dog").unwrap()).await.unwrap();
        todo.name = "walk cat".to_string();
        todo.completed = true;
        assert!(store.save(&todo).await.unwrap());
        assert_eq!(store.find(todo.id).await.unwrap(), Some(todo));
    }

    #[tokio::test]
    async fn delete_is_soft_and_hides_row() {
        let store = store();
        let todo = store.create(NewTodo::new("temp").unwrap()).await.unwrap();

        assert!(store.delete(todo.id).await.unwrap());
        assert!(!store.delete(todo.id).await.unwrap());
        assert_eq!(store.find(todo.id).await.unwrap(), None);
        assert!(store.find_all().await.unwrap().is_empty());
        assert!(!store.save(&todo).await.unwrap());

        let deleted_rows: i64 = store
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM todos WHERE deleted_at IS NOT NULL;",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(deleted_rows, 1);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = store();
        let first = store.create(NewTodo::new("a").unwrap()).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.create(NewTodo::new("b").unwrap()).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn timed_out_create_does_not_commit_after_lock_is_released() {
        use crate::repo::{RepoError, TodoRepository};

        let store = Arc::new(store());
        let repo = TodoRepository::new(store.clone(), Duration::from_millis(50));

        let held = store.conn.lock().unwrap();
        let err = repo.create("ghost").await.unwrap_err();
        assert!(matches!(err, RepoError::Timeout(_)));
        drop(held);

        // Give the queued blocking closure time to take the lock and bail out.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[test]
    fn caller_gone_before_start_skips_op() {
        let store = store();
        let mut conn = store.conn.lock().unwrap();
        let (caller, waiting) = oneshot::channel::<()>();
        drop(waiting);

        let err = run_cancellable(&mut conn, &caller, |_| -> StoreResult<()> {
            panic!("op must not run for a departed caller")
        })
        .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(ref m) if m == "cancelled"));
    }

    #[test]
    fn caller_gone_mid_op_rolls_back_write() {
        let store = store();
        let mut conn = store.conn.lock().unwrap();
        let (caller, waiting) = oneshot::channel::<()>();

        let err = run_cancellable(&mut conn, &caller, move |conn| {
            conn.execute("INSERT INTO todos (name) VALUES ('half-done');", [])?;
            drop(waiting);
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM todos;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.db");

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store.create(NewTodo::new("persisted").unwrap()).await.unwrap().id
        };

        let reopened = SqliteStore::open(&path).unwrap();
        let todo = reopened.find(id).await.unwrap().unwrap();
        assert_eq!(todo.name, "persisted");
    }
}
