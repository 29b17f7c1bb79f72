pub mod config;
pub mod error;
pub mod types;

pub use config::DevbotConfig;
pub use error::{DevbotError, Result};
pub use types::{ConversationId, ItemType, UserId};
