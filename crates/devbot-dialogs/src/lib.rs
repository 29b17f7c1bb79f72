//! Turn-based dialog engine.
//!
//! A [`TurnDispatcher`] takes one inbound activity plus the conversation's
//! loaded state and decides what happens next: resume the active waterfall
//! dialog, begin a new one, or reply directly. All changes are made to an
//! in-memory [`TurnState`]; the caller persists it once the turn succeeds.

pub mod definition;
pub mod dispatcher;
pub mod error;
pub mod messages;
pub mod prompt;
pub mod recognizer;
pub mod steps;
pub mod turn;

pub use definition::{DialogDefinition, DialogSet, StepAction, StepSpec, CREATE_ITEM, IDENTITY};
pub use dispatcher::TurnDispatcher;
pub use error::{ClassifierError, DialogError};
pub use prompt::PromptKind;
pub use recognizer::{
    Entity, IntentClassifier, KeywordClassifier, Recognition, RecognizerClassifier,
    RecognizerClient,
};
pub use turn::{TurnOutcome, TurnState};
