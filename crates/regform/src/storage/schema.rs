//! `SQLite` schema definitions for regform.
//!
//! Records are stored as JSON documents keyed by collection and id, with the
//! store-managed timestamps kept in their own columns.

/// SQL statement to create the records table.
pub const CREATE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS records (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    document TEXT NOT NULL,
    created_at TEXT,
    updated_at TEXT,
    PRIMARY KEY (collection, id)
)
";

/// SQL statement to create an index for newest-first listing.
pub const CREATE_CREATED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_records_created ON records(collection, created_at DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_RECORDS_TABLE,
    CREATE_CREATED_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_records_table_keyed_by_collection_and_id() {
        assert!(CREATE_RECORDS_TABLE.contains("PRIMARY KEY (collection, id)"));
        assert!(CREATE_RECORDS_TABLE.contains("document TEXT NOT NULL"));
        assert!(CREATE_RECORDS_TABLE.contains("created_at TEXT"));
    }
}
