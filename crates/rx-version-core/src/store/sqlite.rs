//! SQLite-backed version store.

use super::{decode_items, encode_items, StoreResult, VersionStore};
use crate::config::STORAGE_KEY;
use crate::db::Database;
use crate::models::VersionItem;

/// Key/value store that keeps the working list under a single key.
pub struct SqliteVersionStore {
    db: Database,
    key: String,
}

impl SqliteVersionStore {
    /// Create a store using the default key.
    pub fn new(db: Database) -> Self {
        Self::with_key(db, STORAGE_KEY)
    }

    /// Create a store scoped to `key`.
    pub fn with_key(db: Database, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying database (the catalog lives next to the store).
    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl VersionStore for SqliteVersionStore {
    fn load(&self) -> StoreResult<Option<Vec<VersionItem>>> {
        let raw = self.db.get_value(&self.key)?;
        raw.as_deref().map(decode_items).transpose()
    }

    fn save(&mut self, items: &[VersionItem]) -> StoreResult<()> {
        let json = encode_items(items)?;
        self.db.put_value(&self.key, &json)?;
        tracing::debug!(key = %self.key, count = items.len(), "Saved version items");
        Ok(())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.db.delete_value(&self.key)?;
        Ok(())
    }
}
