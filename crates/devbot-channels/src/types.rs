use devbot_core::types::{ConversationId, UserId};
use serde::{Deserialize, Serialize};

/// An inbound event from a chat surface: either a user message or a
/// conversation lifecycle signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Logical channel name (e.g. "console").
    pub channel: String,

    pub conversation_id: ConversationId,

    /// Channel-native identifier of the sender.
    pub sender_id: UserId,

    /// Human-readable display name for the sender, if the channel provides one.
    pub sender_name: Option<String>,

    /// RFC3339 timestamp of when the activity was received.
    pub timestamp: String,

    pub kind: ActivityKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ActivityKind {
    /// A user typed something.
    Message { text: String },

    /// Members joined or left the conversation.
    ConversationUpdate {
        #[serde(default)]
        members_added: Vec<String>,
        #[serde(default)]
        members_removed: Vec<String>,
    },
}

impl Activity {
    /// Build a message activity stamped with the current time.
    pub fn message(
        channel: impl Into<String>,
        conversation_id: ConversationId,
        sender_id: UserId,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            conversation_id,
            sender_id,
            sender_name: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind: ActivityKind::Message { text: text.into() },
        }
    }

    /// Build a join signal for `sender_id`.
    pub fn joined(
        channel: impl Into<String>,
        conversation_id: ConversationId,
        sender_id: UserId,
    ) -> Self {
        let member = sender_id.as_str().to_string();
        Self {
            channel: channel.into(),
            conversation_id,
            sender_id,
            sender_name: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind: ActivityKind::ConversationUpdate {
                members_added: vec![member],
                members_removed: Vec::new(),
            },
        }
    }

    /// Message text, or `None` for lifecycle signals.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ActivityKind::Message { text } => Some(text),
            ActivityKind::ConversationUpdate { .. } => None,
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self.kind, ActivityKind::Message { .. })
    }

    /// Reply addressed back into this activity's conversation.
    pub fn reply(&self, content: impl Into<String>) -> OutboundMessage {
        OutboundMessage {
            channel: self.channel.clone(),
            conversation_id: self.conversation_id.clone(),
            content: content.into(),
            format: MessageFormat::PlainText,
        }
    }
}

/// A message to be delivered to an external channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Logical channel name (e.g. "console").
    pub channel: String,

    /// Conversation the message belongs to.
    pub conversation_id: ConversationId,

    /// Content to deliver.
    pub content: String,

    /// Formatting hint for the target platform.
    pub format: MessageFormat,
}

/// Formatting hint for outbound message content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageFormat {
    /// Raw text with no special markup.
    #[default]
    PlainText,

    /// Markdown as understood by the target platform.
    Markdown,
}
