use thiserror::Error;

#[derive(Debug, Error)]
pub enum DevbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown work item type: {0}")]
    UnknownItemType(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}

impl DevbotError {
    /// Short error code string used in log fields and operator reports.
    pub fn code(&self) -> &'static str {
        match self {
            DevbotError::Config(_) => "CONFIG_ERROR",
            DevbotError::UnknownItemType(_) => "UNKNOWN_ITEM_TYPE",
            DevbotError::InvalidId(_) => "INVALID_ID",
        }
    }
}

pub type Result<T> = std::result::Result<T, DevbotError>;
