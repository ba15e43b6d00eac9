//! Persistence for the working version.
//!
//! The builder only sees the [`VersionStore`] trait. Two implementations
//! ship here: [`MemoryStore`] for tests and embedding, and
//! [`SqliteVersionStore`], a scoped key/value store on SQLite.

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use thiserror::Error;

use crate::db::DbError;
use crate::models::VersionItem;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage for the full working list of a version.
pub trait VersionStore {
    /// Read the persisted list, `None` if nothing was stored.
    fn load(&self) -> StoreResult<Option<Vec<VersionItem>>>;

    /// Replace the persisted list.
    fn save(&mut self, items: &[VersionItem]) -> StoreResult<()>;

    /// Forget the persisted list.
    fn clear(&mut self) -> StoreResult<()>;
}

/// Serialize a working list to its persisted JSON form.
pub fn encode_items(items: &[VersionItem]) -> StoreResult<String> {
    Ok(serde_json::to_string(items)?)
}

/// Parse a working list from its persisted JSON form.
pub fn decode_items(json: &str) -> StoreResult<Vec<VersionItem>> {
    Ok(serde_json::from_str(json)?)
}
