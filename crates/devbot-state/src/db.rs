use rusqlite::Connection;

use crate::error::Result;

/// Initialise the key-value state table.
///
/// Idempotent: every statement uses `IF NOT EXISTS`.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS bot_state (
            key         TEXT PRIMARY KEY NOT NULL,
            value       TEXT NOT NULL,  -- JSON
            updated_at  TEXT NOT NULL
        );",
    )?;
    Ok(())
}
