//! Schema migration registry for the SQLite backend.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - The applied version is mirrored to `PRAGMA user_version`.
//! - After migrating, the `todos` table carries every column the store reads.

use rusqlite::Connection;

use super::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_todos.sql"),
}];

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "name",
    "completed",
    "created_at",
    "updated_at",
    "deleted_at",
];

/// Latest schema version this binary can migrate to.
pub(crate) fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies pending migrations in one transaction, then verifies the table shape.
pub(crate) fn apply_migrations(conn: &mut Connection) -> StoreResult<()> {
    let current = current_user_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(StoreError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    // `CREATE TABLE IF NOT EXISTS` silently keeps a foreign table of the same name.
    let existing = todos_columns(conn)?;
    if !existing.is_empty() {
        check_columns(&existing)?;
    }

    if current < latest {
        let tx = conn.transaction()?;
        for migration in MIGRATIONS {
            if migration.version <= current {
                continue;
            }
            tx.execute_batch(migration.sql)?;
            tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        }
        tx.commit()?;
    }

    check_columns(&todos_columns(conn)?)
}

fn current_user_version(conn: &Connection) -> StoreResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn todos_columns(conn: &Connection) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('todos');")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn check_columns(columns: &[String]) -> StoreResult<()> {
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|column| column == required) {
            return Err(StoreError::IncompatibleSchema((*required).to_string()));
        }
    }
    Ok(())
}
