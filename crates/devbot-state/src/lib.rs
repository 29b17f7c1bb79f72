pub mod accessor;
pub mod db;
pub mod error;
pub mod key;
pub mod storage;
pub mod types;

pub use accessor::StateAccessor;
pub use error::StateError;
pub use key::StateKey;
pub use storage::{Change, MemoryStorage, SqliteStorage, Storage};
pub use types::{
    AwaitingField, ConversationData, DialogFrame, DialogStack, PendingCreationRequest,
    UserProfile,
};
