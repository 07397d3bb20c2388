//! SQLite schema definition.

/// Complete database schema for the protocol desk.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-Value Store (origin-scoped local storage)
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                         -- raw string or JSON document
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_kv_updated ON kv_store(updated_at);
"#;
