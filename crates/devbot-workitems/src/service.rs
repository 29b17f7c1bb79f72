use async_trait::async_trait;

use crate::error::WorkItemError;
use crate::types::{NewWorkItem, WorkItem};

/// Backend that turns a finished creation dialog into a real work item.
///
/// Implementations may block on I/O and may fail; callers report the
/// failure to the user and carry on.
#[async_trait]
pub trait WorkItemService: Send + Sync {
    async fn create(&self, req: &NewWorkItem) -> Result<WorkItem, WorkItemError>;
}
