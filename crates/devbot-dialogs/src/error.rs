use devbot_workitems::WorkItemError;
use thiserror::Error;

/// Failures from the external intent classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The classifier could not be reached or timed out.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    /// The classifier answered with a shape we can't interpret.
    #[error("malformed classifier result: {0}")]
    Malformed(String),
}

/// Everything that can go wrong while running a turn.
///
/// Only the configuration variants escape `handle_turn`; classification,
/// creation and validation failures are turned into chat replies inside the
/// dispatcher.
#[derive(Debug, Error)]
pub enum DialogError {
    #[error("unknown dialog: {name}")]
    UnknownDialog { name: String },

    #[error("dialog {dialog} has no step {index}")]
    UnknownStep { dialog: String, index: usize },

    /// A definition or stored frame is internally inconsistent.
    #[error("dialog {dialog} step {step}: {reason}")]
    Misconfigured {
        dialog: String,
        step: String,
        reason: String,
    },

    #[error("classification failed: {0}")]
    Classification(#[from] ClassifierError),

    #[error("work item creation failed: {0}")]
    Creation(#[from] WorkItemError),

    #[error("invalid reply: {0}")]
    Validation(String),
}

impl DialogError {
    /// Fatal errors that abort the turn without persisting anything.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DialogError::UnknownDialog { .. }
                | DialogError::UnknownStep { .. }
                | DialogError::Misconfigured { .. }
        )
    }

    /// Short error code string for log fields.
    pub fn code(&self) -> &'static str {
        match self {
            DialogError::UnknownDialog { .. }
            | DialogError::UnknownStep { .. }
            | DialogError::Misconfigured { .. } => "CONFIGURATION_ERROR",
            DialogError::Classification(_) => "CLASSIFICATION_ERROR",
            DialogError::Creation(_) => "CREATION_SERVICE_ERROR",
            DialogError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, DialogError>;
