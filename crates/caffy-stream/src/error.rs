use thiserror::Error;

/// Failures that end a turn early.
///
/// Malformed frames never surface here; they degrade to literal text.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The byte source itself failed mid-stream.
    #[error("stream read error: {source}")]
    Transport {
        /// Message text accumulated before the failure.
        partial: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StreamError {
    /// Text the user had already seen when the stream broke.
    pub fn partial_message(&self) -> &str {
        match self {
            StreamError::Transport { partial, .. } => partial,
        }
    }
}
