use thiserror::Error;

use crate::logic::path::PathError;

/// Every failure a generation request can surface to its caller.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or malformed request input. Raised before any network call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The template document could not be read or is not a graph.
    #[error("failed to load workflow template {path}: {reason}")]
    Load { path: String, reason: String },

    /// The engine rejected the graph or could not be reached on `/prompt`.
    #[error("prompt submission failed{}: {detail}", status_suffix(.status))]
    Submission { status: Option<u16>, detail: String },

    /// A history poll failed with something other than "not yet known".
    #[error("history poll failed{}: {detail}", status_suffix(.status))]
    PollTransport { status: Option<u16>, detail: String },

    /// The deadline passed without a terminal history record.
    #[error("job {prompt_id} did not complete within {timeout_ms} ms")]
    Timeout { prompt_id: String, timeout_ms: u64 },

    /// An override path collided with the node's existing structure.
    #[error("override could not be applied: {0}")]
    Path(#[from] PathError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RelayError {
    /// Stable name of the variant, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Validation(_) => "validation",
            RelayError::Load { .. } => "load",
            RelayError::Submission { .. } => "submission",
            RelayError::PollTransport { .. } => "poll_transport",
            RelayError::Timeout { .. } => "timeout",
            RelayError::Path(_) => "path",
            RelayError::Config(_) => "config",
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" ({code})"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_message_includes_status() {
        let err = RelayError::Submission {
            status: Some(500),
            detail: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "prompt submission failed (500): boom");

        let err = RelayError::PollTransport {
            status: None,
            detail: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "history poll failed: connection refused");
    }

    #[test]
    fn test_timeout_is_distinct_from_transport() {
        let timeout = RelayError::Timeout {
            prompt_id: "p-1".to_string(),
            timeout_ms: 1000,
        };
        let transport = RelayError::PollTransport {
            status: Some(502),
            detail: String::new(),
        };
        assert_eq!(timeout.kind(), "timeout");
        assert_eq!(transport.kind(), "poll_transport");
    }
}
