use rusqlite::Connection;

use crate::error::Result;

/// Initialise the work item ledger table and its index.
///
/// Idempotent: every statement uses `IF NOT EXISTS`.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS work_items (
            id              TEXT PRIMARY KEY NOT NULL,
            item_type       TEXT NOT NULL,
            description     TEXT NOT NULL,
            assign_to_self  INTEGER NOT NULL DEFAULT 0,
            actor_id        TEXT NOT NULL,
            created_at      TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_work_items_actor
            ON work_items(actor_id, created_at DESC);",
    )?;
    Ok(())
}
