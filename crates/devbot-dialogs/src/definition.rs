use std::collections::HashMap;

use tracing::debug;

use crate::error::{DialogError, Result};
use crate::prompt::PromptKind;

/// Collects the user's name and Azure DevOps id.
pub const IDENTITY: &str = "identity";
/// Builds and submits a new work item.
pub const CREATE_ITEM: &str = "create_item";

/// The logic a step runs. Resolved by the step runner, never captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    PromptName,
    ConfirmName,
    PromptExternalId,
    ConfirmExternalId,
    PromptDescription,
    ConfirmDescription,
    PromptAssignSelf,
    SubmitItem,
}

/// One waterfall step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSpec {
    pub name: &'static str,
    pub action: StepAction,
    /// Reply shape this step waits for after prompting. `None` means the
    /// step never suspends the dialog.
    pub input: Option<PromptKind>,
}

impl StepSpec {
    pub const fn passthrough(name: &'static str, action: StepAction) -> Self {
        Self {
            name,
            action,
            input: None,
        }
    }

    pub const fn prompt(name: &'static str, action: StepAction, kind: PromptKind) -> Self {
        Self {
            name,
            action,
            input: Some(kind),
        }
    }

    pub fn awaits_input(&self) -> bool {
        self.input.is_some()
    }
}

/// A named, ordered list of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogDefinition {
    pub name: String,
    pub steps: Vec<StepSpec>,
}

impl DialogDefinition {
    pub fn new(name: impl Into<String>, steps: Vec<StepSpec>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    pub fn identity() -> Self {
        Self::new(
            IDENTITY,
            vec![
                StepSpec::prompt("prompt_name", StepAction::PromptName, PromptKind::Text),
                StepSpec::passthrough("confirm_name", StepAction::ConfirmName),
                StepSpec::prompt(
                    "prompt_external_id",
                    StepAction::PromptExternalId,
                    PromptKind::Text,
                ),
                StepSpec::passthrough("confirm_external_id", StepAction::ConfirmExternalId),
            ],
        )
    }

    pub fn create_item() -> Self {
        Self::new(
            CREATE_ITEM,
            vec![
                StepSpec::prompt(
                    "prompt_description",
                    StepAction::PromptDescription,
                    PromptKind::Text,
                ),
                StepSpec::passthrough("confirm_description", StepAction::ConfirmDescription),
                StepSpec::prompt(
                    "prompt_assign_self",
                    StepAction::PromptAssignSelf,
                    PromptKind::Confirm,
                ),
                StepSpec::passthrough("submit_item", StepAction::SubmitItem),
            ],
        )
    }

    pub fn step(&self, index: usize) -> Result<&StepSpec> {
        self.steps.get(index).ok_or_else(|| DialogError::UnknownStep {
            dialog: self.name.clone(),
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Lookup table of dialog definitions keyed by name.
#[derive(Debug, Clone, Default)]
pub struct DialogSet {
    dialogs: HashMap<String, DialogDefinition>,
}

impl DialogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity and item-creation dialogs.
    pub fn standard() -> Self {
        let mut set = Self::new();
        set.add(DialogDefinition::identity());
        set.add(DialogDefinition::create_item());
        set
    }

    /// Register a definition, replacing any with the same name.
    pub fn add(&mut self, def: DialogDefinition) {
        debug!(dialog = %def.name, steps = def.len(), "dialog registered");
        self.dialogs.insert(def.name.clone(), def);
    }

    pub fn get(&self, name: &str) -> Result<&DialogDefinition> {
        self.dialogs
            .get(name)
            .ok_or_else(|| DialogError::UnknownDialog {
                name: name.to_string(),
            })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialogs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
