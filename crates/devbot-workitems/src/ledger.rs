use std::sync::Mutex;

use async_trait::async_trait;
use devbot_core::types::ItemType;
use rusqlite::Connection;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{Result, WorkItemError};
use crate::service::WorkItemService;
use crate::types::{NewWorkItem, WorkItem};

/// Local work item backend that records every created item in SQLite.
///
/// Stands in for the Azure DevOps REST API when the bot runs standalone.
pub struct SqliteWorkItems {
    db: Mutex<Connection>,
}

impl SqliteWorkItems {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    fn insert(&self, req: &NewWorkItem) -> Result<WorkItem> {
        if req.description.trim().is_empty() {
            return Err(WorkItemError::Invalid("description is empty".to_string()));
        }
        if req.actor_id.trim().is_empty() {
            return Err(WorkItemError::Invalid("actor id is empty".to_string()));
        }

        let item = WorkItem {
            id: Uuid::now_v7().to_string(),
            item_type: req.item_type,
            description: req.description.clone(),
            assign_to_self: req.assign_to_self,
            actor_id: req.actor_id.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let db = self.db.lock().map_err(|_| WorkItemError::LockPoisoned)?;
        db.execute(
            "INSERT INTO work_items
             (id, item_type, description, assign_to_self, actor_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                item.id,
                item.item_type.as_str(),
                item.description,
                item.assign_to_self as i32,
                item.actor_id,
                item.created_at
            ],
        )?;
        Ok(item)
    }

    /// Most recent items created by `actor_id`, newest first.
    #[instrument(skip(self))]
    pub fn list_for_actor(&self, actor_id: &str, limit: usize) -> Result<Vec<WorkItem>> {
        let db = self.db.lock().map_err(|_| WorkItemError::LockPoisoned)?;
        let mut stmt = db.prepare(
            "SELECT id, item_type, description, assign_to_self, actor_id, created_at
             FROM work_items
             WHERE actor_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(rusqlite::params![actor_id, limit as i64], row_to_item)?;
        let items = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}

#[async_trait]
impl WorkItemService for SqliteWorkItems {
    async fn create(&self, req: &NewWorkItem) -> Result<WorkItem> {
        let item = self.insert(req)?;
        info!(
            id = %item.id,
            item_type = %item.item_type,
            actor = %item.actor_id,
            "work item created"
        );
        Ok(item)
    }
}

/// Map a SQLite row to a `WorkItem`.
fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkItem> {
    let raw_type: String = row.get(1)?;
    let item_type = ItemType::from_label(&raw_type).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("unknown item type: {raw_type}").into(),
        )
    })?;

    Ok(WorkItem {
        id: row.get(0)?,
        item_type,
        description: row.get(2)?,
        assign_to_self: row.get::<_, i32>(3)? != 0,
        actor_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}
