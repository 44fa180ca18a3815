//! Database migrations for the label store.
//!
//! Each migration is a function that upgrades the schema by one version.
//! Migrations are run automatically when the database is opened.

use rusqlite::Connection;

use crate::error::LabelerError;

/// Current schema version.
const CURRENT_VERSION: i32 = 1;

/// Get the current schema version from the database.
///
/// Returns 0 if no version has been set (new database).
pub fn get_version(conn: &Connection) -> Result<i32, LabelerError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| LabelerError::Database(format!("Failed to get schema version: {e}")))
}

/// Set the schema version in the database.
fn set_version(conn: &Connection, version: i32) -> Result<(), LabelerError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| LabelerError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), LabelerError> {
    let current = get_version(conn)?;

    if current >= CURRENT_VERSION {
        return Ok(());
    }

    for version in (current + 1)..=CURRENT_VERSION {
        run_migration(conn, version)?;
        set_version(conn, version)?;
    }

    Ok(())
}

/// Run a specific migration.
fn run_migration(conn: &Connection, version: i32) -> Result<(), LabelerError> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(LabelerError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: one row per labeled image.
fn migrate_v1(conn: &Connection) -> Result<(), LabelerError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS labels (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            image TEXT NOT NULL UNIQUE,
            text TEXT NOT NULL,
            saved_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_labels_saved_at ON labels(saved_at);
        ",
    )
    .map_err(|e| LabelerError::Database(format!("Migration v1 failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_on_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_version(&conn).unwrap(), 0);

        run(&conn).unwrap();
        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM labels", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();
        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);
    }
}
