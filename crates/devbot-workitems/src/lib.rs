pub mod db;
pub mod error;
pub mod ledger;
pub mod service;
pub mod types;

pub use error::WorkItemError;
pub use ledger::SqliteWorkItems;
pub use service::WorkItemService;
pub use types::{NewWorkItem, WorkItem};
