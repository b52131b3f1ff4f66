//! SQLite schema definition.

/// Complete database schema for vision-records.
///
/// The application persists its whole state as two entries in one key-value
/// table: the record list as a single JSON blob under `patients`, and the
/// login flag under `isLoggedIn`. Each write replaces the prior value.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Application State
-- ============================================================================

CREATE TABLE IF NOT EXISTS app_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
    }
}
