use async_trait::async_trait;

use crate::{error::ChannelError, types::OutboundMessage};

/// Outbound side of a chat surface (console, Teams, Slack, …).
///
/// Delivery is fire-and-forget from the bot's point of view: an `Ok` means
/// the adapter accepted the message, not that the user has seen it.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Stable lowercase identifier for this channel (e.g. `"console"`).
    ///
    /// Used as the key inside [`ChannelManager`](crate::manager::ChannelManager)
    /// and matched against [`OutboundMessage::channel`].
    fn name(&self) -> &str;

    /// Deliver a single message into the conversation it names.
    async fn send(&self, msg: &OutboundMessage) -> Result<(), ChannelError>;
}
