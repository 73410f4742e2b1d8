//! SQLite schema for the ledger table

/// SQL schema for the ledger database
///
/// The ledger is a single row; `id` is pinned to 1 so an upsert always
/// targets the same blob.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS ledger (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    blob BLOB NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
