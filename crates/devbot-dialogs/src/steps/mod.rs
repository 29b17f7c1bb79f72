//! Step runner: maps a [`StepAction`] to its logic.

mod create_item;
mod identity;

use devbot_workitems::WorkItemService;
use serde_json::Value;

use crate::definition::StepAction;
use crate::error::{DialogError, Result};
use crate::turn::TurnState;

/// What a step asks the waterfall to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Run the following step now, handing it this value.
    Next(Value),
    /// Send this prompt and wait for the user's reply.
    Prompt(String),
    /// Finish the dialog with this result.
    End(Value),
}

/// Everything a step can see and touch.
pub struct StepContext<'a> {
    pub dialog: &'a str,
    pub step: &'a str,
    /// Launch argument of the dialog.
    pub options: &'a Value,
    /// Output of the previous step, or the recognised reply to its prompt.
    pub input: Value,
    pub state: &'a mut TurnState,
    pub replies: &'a mut Vec<String>,
    pub work_items: &'a dyn WorkItemService,
}

impl StepContext<'_> {
    pub fn say(&mut self, text: impl Into<String>) {
        self.replies.push(text.into());
    }

    /// The input as text, if the previous step produced a string.
    pub fn input_text(&self) -> Option<&str> {
        self.input.as_str()
    }

    pub fn misconfigured(&self, reason: impl Into<String>) -> DialogError {
        DialogError::Misconfigured {
            dialog: self.dialog.to_string(),
            step: self.step.to_string(),
            reason: reason.into(),
        }
    }
}

pub async fn run(action: StepAction, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
    match action {
        StepAction::PromptName => Ok(identity::prompt_name(ctx)),
        StepAction::ConfirmName => Ok(identity::confirm_name(ctx)),
        StepAction::PromptExternalId => Ok(identity::prompt_external_id(ctx)),
        StepAction::ConfirmExternalId => identity::confirm_external_id(ctx),
        StepAction::PromptDescription => create_item::prompt_description(ctx),
        StepAction::ConfirmDescription => create_item::confirm_description(ctx),
        StepAction::PromptAssignSelf => Ok(create_item::prompt_assign_self()),
        StepAction::SubmitItem => create_item::submit_item(ctx).await,
    }
}
