use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::{channel::Channel, error::ChannelError, types::OutboundMessage};

/// Routes outbound messages to the adapter registered for their channel.
pub struct ChannelManager {
    channels: HashMap<String, Box<dyn Channel>>,
}

impl ChannelManager {
    /// Create an empty manager with no registered channels.
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }

    /// Register a channel adapter.
    ///
    /// If a channel with the same name is already registered it is replaced.
    pub fn register(&mut self, channel: Box<dyn Channel>) {
        let name = channel.name().to_string();
        info!(channel = %name, "registering channel adapter");
        self.channels.insert(name, channel);
    }

    /// Return the named channel, if it exists.
    pub fn get(&self, name: &str) -> Option<&dyn Channel> {
        self.channels.get(name).map(|b| b.as_ref())
    }

    /// Registered channel names, sorted for deterministic output.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }

    /// Send one message through the adapter named by `msg.channel`.
    pub async fn deliver(&self, msg: &OutboundMessage) -> Result<(), ChannelError> {
        let channel = self
            .channels
            .get(&msg.channel)
            .ok_or_else(|| ChannelError::UnknownChannel(msg.channel.clone()))?;
        channel.send(msg).await?;
        debug!(channel = %msg.channel, conversation = %msg.conversation_id, "message delivered");
        Ok(())
    }

    /// Deliver messages in order. Failures are logged and skipped, never
    /// propagated. Returns how many were accepted.
    pub async fn deliver_all(&self, msgs: &[OutboundMessage]) -> usize {
        let mut delivered = 0;
        for msg in msgs {
            match self.deliver(msg).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        channel = %msg.channel,
                        conversation = %msg.conversation_id,
                        error = %e,
                        "failed to deliver message"
                    );
                }
            }
        }
        delivered
    }
}

impl Default for ChannelManager {
    fn default() -> Self {
        Self::new()
    }
}
