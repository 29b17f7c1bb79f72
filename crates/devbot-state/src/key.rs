use devbot_core::types::{ConversationId, UserId};

pub const USER_PROFILE: &str = "UserProfile";
pub const CONVERSATION_DATA: &str = "ConversationData";
pub const DIALOG_STATE: &str = "DialogState";
pub const PENDING_CREATION: &str = "CreateNewData";

/// Who owns a record: a user (profile) or a single conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    User,
    Conversation,
}

impl Scope {
    fn prefix(&self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Conversation => "conversation",
        }
    }
}

/// Structured storage key.
///
/// Format: `{scope}:{owner_id}:{property}`, e.g.
/// `user:u-42:UserProfile` or `conversation:c-7:DialogState`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub scope: Scope,
    pub owner: String,
    pub property: &'static str,
}

impl StateKey {
    pub fn profile(user: &UserId) -> Self {
        Self::user(user, USER_PROFILE)
    }

    pub fn conversation_data(conversation: &ConversationId) -> Self {
        Self::conversation(conversation, CONVERSATION_DATA)
    }

    pub fn dialog_stack(conversation: &ConversationId) -> Self {
        Self::conversation(conversation, DIALOG_STATE)
    }

    pub fn pending_creation(conversation: &ConversationId) -> Self {
        Self::conversation(conversation, PENDING_CREATION)
    }

    pub fn user(user: &UserId, property: &'static str) -> Self {
        Self {
            scope: Scope::User,
            owner: user.as_str().to_string(),
            property,
        }
    }

    pub fn conversation(conversation: &ConversationId, property: &'static str) -> Self {
        Self {
            scope: Scope::Conversation,
            owner: conversation.as_str().to_string(),
            property,
        }
    }

    /// Canonical string stored in the `key` column.
    pub fn format(&self) -> String {
        format!("{}:{}:{}", self.scope.prefix(), self.owner, self.property)
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_and_conversation_keys_do_not_collide() {
        let user = StateKey::profile(&UserId::from("same"));
        let conv = StateKey::conversation_data(&ConversationId::from("same"));
        assert_eq!(user.format(), "user:same:UserProfile");
        assert_eq!(conv.format(), "conversation:same:ConversationData");
        assert_ne!(user.format(), conv.format());
    }
}
