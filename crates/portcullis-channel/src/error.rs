use portcullis_types::AccessError;
use thiserror::Error;

/// Errors from the gate command channel.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The transport connection is down or closed
    #[error("command channel unavailable: {0}")]
    Unavailable(String),

    /// A command failed to serialize into its wire envelope
    #[error("command encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<ChannelError> for AccessError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Unavailable(msg) => AccessError::ServiceUnavailable(msg),
            ChannelError::Encoding(e) => AccessError::Internal(e.to_string()),
        }
    }
}
