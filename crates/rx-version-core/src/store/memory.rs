//! In-memory version store.

use super::{decode_items, encode_items, StoreResult, VersionStore};
use crate::models::VersionItem;

/// Store that keeps the serialized list in memory.
///
/// Holds the same JSON blob a persistent store would, so it can be seeded
/// with arbitrary (including corrupt) data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    raw: Option<String>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `raw`.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            saves: 0,
        }
    }

    /// The stored blob, if any.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl VersionStore for MemoryStore {
    fn load(&self) -> StoreResult<Option<Vec<VersionItem>>> {
        self.raw.as_deref().map(decode_items).transpose()
    }

    fn save(&mut self, items: &[VersionItem]) -> StoreResult<()> {
        self.raw = Some(encode_items(items)?);
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.raw = None;
        Ok(())
    }
}
