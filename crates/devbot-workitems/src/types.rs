use devbot_core::types::ItemType;
use serde::{Deserialize, Serialize};

/// Everything needed to create a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkItem {
    pub item_type: ItemType,
    pub description: String,
    pub assign_to_self: bool,
    /// Azure DevOps id of the requesting user.
    pub actor_id: String,
}

/// A created work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// UUIDv7, so ids sort by creation time.
    pub id: String,
    pub item_type: ItemType,
    pub description: String,
    pub assign_to_self: bool,
    pub actor_id: String,
    /// RFC3339 creation timestamp.
    pub created_at: String,
}
