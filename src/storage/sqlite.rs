//! `SQLite` label store.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use crate::core::{Label, LabelStore, StoreReceipt};
use crate::error::LabelerError;

use super::{normalize_label, Database};

/// Label store backed by a [`Database`]. Saving an image again replaces its label.
pub struct SqliteLabelStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteLabelStore {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, LabelerError> {
        Ok(Self::from_database(Database::open_at(path)?))
    }

    /// Wrap an already open database.
    #[must_use]
    pub fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Run `f` against the database on the blocking pool.
    async fn with_db<T, F>(&self, f: F) -> Result<T, LabelerError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, LabelerError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|_| LabelerError::Database("Database lock poisoned".to_string()))?;
            f(&db)
        })
        .await
        .map_err(|e| LabelerError::Database(format!("Database task failed: {e}")))?
    }
}

#[async_trait]
impl LabelStore for SqliteLabelStore {
    async fn save(&self, id: &str, text: &str) -> Result<StoreReceipt, LabelerError> {
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(LabelerError::Store(format!("Invalid image name: {id:?}")));
        }
        let cleaned = normalize_label(text);
        if cleaned.is_empty() {
            return Err(LabelerError::Store("Label text is required".to_string()));
        }

        let image = id.to_string();
        let text = cleaned.clone();
        self.with_db(move |db| db.upsert_label(&image, &text)).await?;
        info!(image = id, text = %cleaned, "Saved label");
        Ok(StoreReceipt { success: true })
    }

    async fn labels(&self) -> Result<Vec<Label>, LabelerError> {
        self.with_db(Database::labels).await
    }
}
