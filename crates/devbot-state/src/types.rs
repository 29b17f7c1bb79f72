use devbot_core::types::ItemType;
use serde::{Deserialize, Serialize};

/// What the bot knows about the person it is talking to.
///
/// Created empty on first contact and filled in by the identity dialog.
/// Empty strings mean "not collected yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    /// Azure DevOps account id, used as the actor on created work items.
    #[serde(default)]
    pub external_id: String,
}

impl UserProfile {
    /// Both identity fields have been collected.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.external_id.is_empty()
    }
}

/// Which profile field an outstanding prompt is collecting, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwaitingField {
    #[default]
    None,
    Name,
    ExternalId,
}

/// Per-conversation bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationData {
    /// RFC3339 time of the most recent incoming message.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Channel the most recent message arrived on.
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Non-`None` only while a prompt for that field is outstanding.
    #[serde(default)]
    pub awaiting: AwaitingField,
}

impl ConversationData {
    pub fn stamp(&mut self, timestamp: &str, channel: &str) {
        self.timestamp = Some(timestamp.to_string());
        self.channel_id = Some(channel.to_string());
    }
}

/// One running dialog: which definition, which step, and the values
/// flowing between steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogFrame {
    pub dialog: String,
    /// Index of the last step that ran. Only ever increases.
    pub step_index: usize,
    /// Launch argument supplied when the dialog was begun.
    #[serde(default)]
    pub options: serde_json::Value,
    /// Value produced by the last step (or the last consumed reply).
    #[serde(default)]
    pub result: serde_json::Value,
    /// True when the step at `step_index` prompted and is waiting for a reply.
    #[serde(default)]
    pub awaiting_input: bool,
}

impl DialogFrame {
    pub fn new(dialog: impl Into<String>, options: serde_json::Value) -> Self {
        Self {
            dialog: dialog.into(),
            step_index: 0,
            options,
            result: serde_json::Value::Null,
            awaiting_input: false,
        }
    }
}

/// Per-conversation stack of dialog frames. The top frame is the active one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogStack {
    frames: Vec<DialogFrame>,
}

impl DialogStack {
    pub fn push(&mut self, frame: DialogFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<DialogFrame> {
        self.frames.pop()
    }

    pub fn top(&self) -> Option<&DialogFrame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut DialogFrame> {
        self.frames.last_mut()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[DialogFrame] {
        &self.frames
    }
}

impl From<Vec<DialogFrame>> for DialogStack {
    fn from(frames: Vec<DialogFrame>) -> Self {
        Self { frames }
    }
}

/// Work item being assembled across the steps of the creation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCreationRequest {
    pub item_type: ItemType,
    #[serde(default)]
    pub description: String,
    /// `None` until the user has answered the assign-to-self question.
    #[serde(default)]
    pub assign_to_self: Option<bool>,
}

impl PendingCreationRequest {
    pub fn new(item_type: ItemType) -> Self {
        Self {
            item_type,
            description: String::new(),
            assign_to_self: None,
        }
    }
}
