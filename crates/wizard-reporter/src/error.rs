//! Error types for remote forwarding

/// Failures while forwarding a report to the remote sink
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Endpoint is not a valid URL
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// Offending value
        endpoint: String,
        /// Parser message
        reason: String,
    },

    /// Request could not be delivered
    #[error("transport error: {0}")]
    Transport(String),

    /// Endpoint answered with a non-2xx status
    #[error("endpoint rejected report with status {0}")]
    Status(u16),

    /// Report could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Status(status.as_u16()),
            None => Self::Transport(err.to_string()),
        }
    }
}
