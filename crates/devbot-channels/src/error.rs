use thiserror::Error;

/// Errors that can occur within any channel adapter.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A message could not be delivered to the remote endpoint.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// No adapter is registered under the requested name.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),
}
