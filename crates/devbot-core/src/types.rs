use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{DevbotError, Result};

/// Channel-native identifier of the person talking to the bot.
///
/// User-scoped records (the profile) are keyed by this value, so the same
/// person keeps their profile across conversations on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Validate and wrap a raw identifier. Blank ids are rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DevbotError::InvalidId("user id must not be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a single conversation. Conversation-scoped records
/// (dialog stack, conversation data, pending request) are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    /// Fresh random id for hosts that don't get one from the channel.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DevbotError::InvalidId(
                "conversation id must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Azure DevOps work item kinds the bot knows how to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Feature,
    Epic,
    #[serde(rename = "Test Case")]
    TestCase,
    Task,
    #[serde(rename = "User Story")]
    UserStory,
    Bug,
}

/// Recognised labels (upper-cased) and the item type each one maps to.
const ITEM_TYPE_LABELS: &[(&str, ItemType)] = &[
    ("FEATURE", ItemType::Feature),
    ("EPIC", ItemType::Epic),
    ("TEST CASE", ItemType::TestCase),
    ("TASK", ItemType::Task),
    ("USER STORY", ItemType::UserStory),
    ("BUG", ItemType::Bug),
];

impl ItemType {
    /// Every known type, in lookup-table order.
    pub fn all() -> impl Iterator<Item = ItemType> {
        ITEM_TYPE_LABELS.iter().map(|(_, t)| *t)
    }

    /// Case-insensitive lookup of a classifier entity value.
    /// Surrounding whitespace is ignored and inner runs of whitespace are
    /// collapsed, so `"user   story"` still resolves.
    pub fn from_label(label: &str) -> Option<ItemType> {
        let normalized = label
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        ITEM_TYPE_LABELS
            .iter()
            .find(|(l, _)| *l == normalized)
            .map(|(_, t)| *t)
    }

    /// Upper-cased label used for keyword matching.
    pub fn label(&self) -> &'static str {
        match self {
            ItemType::Feature => "FEATURE",
            ItemType::Epic => "EPIC",
            ItemType::TestCase => "TEST CASE",
            ItemType::Task => "TASK",
            ItemType::UserStory => "USER STORY",
            ItemType::Bug => "BUG",
        }
    }

    /// Canonical display name, as shown to users and sent to the service.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Feature => "Feature",
            ItemType::Epic => "Epic",
            ItemType::TestCase => "Test Case",
            ItemType::Task => "Task",
            ItemType::UserStory => "User Story",
            ItemType::Bug => "Bug",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = DevbotError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ItemType::from_label(s).ok_or_else(|| DevbotError::UnknownItemType(s.to_string()))
    }
}
