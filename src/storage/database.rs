//! `SQLite` database connection and label queries.
//!
//! Used by the sqlite label backend. The database holds a single `labels`
//! table keyed by image name; saving an image twice keeps the latest text.

use chrono::Local;
use rusqlite::{params, Connection};

use crate::core::Label;
use crate::error::LabelerError;

use super::migrations;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at a specific path.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &std::path::Path) -> Result<Self, LabelerError> {
        let conn = Connection::open(path).map_err(|e| {
            LabelerError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;

        let db = Self { conn };
        db.migrate()?;

        Ok(db)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, LabelerError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            LabelerError::Database(format!("Failed to open in-memory database: {e}"))
        })?;

        let db = Self { conn };
        db.migrate()?;

        Ok(db)
    }

    /// Run database migrations.
    fn migrate(&self) -> Result<(), LabelerError> {
        migrations::run(&self.conn)
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, LabelerError> {
        migrations::get_version(&self.conn)
    }

    /// Insert or replace the label for an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_label(&self, image: &str, text: &str) -> Result<(), LabelerError> {
        self.conn
            .execute(
                r"INSERT INTO labels (image, text, saved_at) VALUES (?1, ?2, ?3)
                  ON CONFLICT(image) DO UPDATE
                  SET text = excluded.text, saved_at = excluded.saved_at",
                params![image, text, Local::now().to_rfc3339()],
            )
            .map_err(|e| LabelerError::Database(format!("Failed to save label for {image}: {e}")))?;
        Ok(())
    }

    /// All labels, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn labels(&self) -> Result<Vec<Label>, LabelerError> {
        let mut stmt = self
            .conn
            .prepare("SELECT image, text FROM labels ORDER BY saved_at ASC, id ASC")
            .map_err(|e| LabelerError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Label {
                    image: row.get(0)?,
                    text: row.get(1)?,
                })
            })
            .map_err(|e| LabelerError::Database(format!("Failed to query labels: {e}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| LabelerError::Database(format!("Failed to read label row: {e}")))
    }
}
