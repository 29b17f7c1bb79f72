use std::sync::Arc;

use dashmap::DashMap;
use devbot_channels::{Activity, ChannelManager, OutboundMessage};
use devbot_core::types::ConversationId;
use devbot_dialogs::{messages, DialogError, TurnDispatcher, TurnOutcome, TurnState};
use devbot_state::{
    ConversationData, DialogStack, StateAccessor, StateError, StateKey, Storage, UserProfile,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};

#[derive(Debug, Error)]
pub enum BotError {
    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("dialog error: {0}")]
    Dialog(#[from] DialogError),
}

impl BotError {
    pub fn code(&self) -> &'static str {
        match self {
            BotError::State(_) => "STATE_ERROR",
            BotError::Dialog(e) => e.code(),
        }
    }
}

/// What one call to [`BotRuntime::on_activity`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub replies: usize,
    pub delivered: usize,
    /// Records written by the closing `save()`.
    pub saved: usize,
    /// The turn failed, nothing was persisted and the user got an apology.
    pub aborted: bool,
}

/// Load, dispatch, persist, deliver. One turn per conversation at a time.
pub struct BotRuntime {
    storage: Arc<dyn Storage>,
    channels: ChannelManager,
    dispatcher: TurnDispatcher,
    /// Per-conversation turn locks: conversation id -> mutex.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Storage keys touched by a turn.
struct TurnKeys {
    profile: StateKey,
    conversation: StateKey,
    stack: StateKey,
    pending: StateKey,
}

impl TurnKeys {
    fn for_activity(activity: &Activity) -> Self {
        Self {
            profile: StateKey::profile(&activity.sender_id),
            conversation: StateKey::conversation_data(&activity.conversation_id),
            stack: StateKey::dialog_stack(&activity.conversation_id),
            pending: StateKey::pending_creation(&activity.conversation_id),
        }
    }

    fn all(&self) -> [StateKey; 4] {
        [
            self.profile.clone(),
            self.conversation.clone(),
            self.stack.clone(),
            self.pending.clone(),
        ]
    }
}

impl BotRuntime {
    pub fn new(
        storage: Arc<dyn Storage>,
        channels: ChannelManager,
        dispatcher: TurnDispatcher,
    ) -> Self {
        Self {
            storage,
            channels,
            dispatcher,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, conversation: &ConversationId) -> Arc<Mutex<()>> {
        Arc::clone(&self.locks.entry(conversation.as_str().to_string()).or_default())
    }

    /// Drop the conversation's lock entry once no turn holds or waits on it.
    fn release_lock(&self, conversation: &ConversationId) {
        self.locks
            .remove_if(conversation.as_str(), |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Run one turn. Any failure is answered with an apology and leaves the
    /// stored state untouched, so a later turn can still get through.
    #[instrument(skip_all, fields(conversation = %activity.conversation_id, user = %activity.sender_id))]
    pub async fn on_activity(&self, activity: &Activity) -> TurnReport {
        let lock = self.lock_for(&activity.conversation_id);
        let guard = lock.lock().await;

        let report = match self.process(activity).await {
            Ok((replies, saved)) => {
                let outbound: Vec<OutboundMessage> =
                    replies.iter().map(|r| activity.reply(r.as_str())).collect();
                let delivered = self.channels.deliver_all(&outbound).await;
                debug!(replies = outbound.len(), delivered, saved, "turn complete");
                TurnReport {
                    replies: outbound.len(),
                    delivered,
                    saved,
                    aborted: false,
                }
            }
            Err(e) => {
                error!(code = e.code(), error = %e, "turn aborted, nothing persisted");
                let delivered = self
                    .channels
                    .deliver_all(&[activity.reply(messages::APOLOGY)])
                    .await;
                TurnReport {
                    replies: 1,
                    delivered,
                    saved: 0,
                    aborted: true,
                }
            }
        };

        drop(guard);
        drop(lock);
        self.release_lock(&activity.conversation_id);
        report
    }

    /// Load, dispatch, stage and save. Returns the replies and the number of
    /// records written.
    async fn process(&self, activity: &Activity) -> Result<(Vec<String>, usize), BotError> {
        let keys = TurnKeys::for_activity(activity);
        let mut accessor = StateAccessor::new(self.storage.as_ref());
        accessor.prefetch(&keys.all())?;

        let state = TurnState {
            profile: accessor.get(&keys.profile, UserProfile::default)?,
            conversation: accessor.get(&keys.conversation, ConversationData::default)?,
            stack: accessor.get(&keys.stack, DialogStack::default)?,
            pending: accessor.get(&keys.pending, || None)?,
        };

        let TurnOutcome { state, replies } = self.dispatcher.handle_turn(activity, state).await?;

        accessor.set(&keys.profile, &state.profile)?;
        accessor.set(&keys.conversation, &state.conversation)?;
        accessor.set(&keys.stack, &state.stack)?;
        match &state.pending {
            Some(pending) => accessor.set(&keys.pending, pending)?,
            None => accessor.delete(&keys.pending),
        }
        let saved = accessor.save()?;
        Ok((replies, saved))
    }
}
