use devbot_state::{ConversationData, DialogStack, PendingCreationRequest, UserProfile};

/// Everything a turn may read or change, loaded before the turn and
/// persisted after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnState {
    pub profile: UserProfile,
    pub conversation: ConversationData,
    pub stack: DialogStack,
    /// Work item being assembled by the creation dialog, if one is running.
    pub pending: Option<PendingCreationRequest>,
}

/// Result of a successful turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub state: TurnState,
    /// Replies for the user, in send order.
    pub replies: Vec<String>,
}

impl TurnOutcome {
    pub fn silent(state: TurnState) -> Self {
        Self {
            state,
            replies: Vec::new(),
        }
    }
}
