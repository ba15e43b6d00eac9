//! SQLite schema definition.

/// Complete database schema for rx-version.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Medicine Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS medicine_catalog (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    base_price REAL NOT NULL,                     -- A
    insurance_price REAL NOT NULL,                -- B
    price_difference REAL NOT NULL,               -- C
    ceiling INTEGER NOT NULL DEFAULT 0,           -- E
    insurance_percent REAL NOT NULL,              -- G, fraction in [0, 1]
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Key/Value Store
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                          -- Opaque serialized blob
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
