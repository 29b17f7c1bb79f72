pub mod channel;
pub mod error;
pub mod manager;
pub mod types;

pub use channel::Channel;
pub use error::ChannelError;
pub use manager::ChannelManager;
pub use types::{Activity, ActivityKind, MessageFormat, OutboundMessage};
