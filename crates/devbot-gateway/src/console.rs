use async_trait::async_trait;
use devbot_channels::{Channel, ChannelError, OutboundMessage};

/// Prints bot replies to stdout.
pub struct ConsoleChannel {
    name: String,
}

impl ConsoleChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Channel for ConsoleChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, msg: &OutboundMessage) -> Result<(), ChannelError> {
        println!("bot> {}", msg.content);
        Ok(())
    }
}
