use std::path::PathBuf;

/// Errors related to configuration loading and parsing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Failures reported by an agent-run client.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The run was aborted on request. Never surfaced as a session error.
    #[error("Run cancelled")]
    Cancelled,

    #[error("Failed to connect to agent: {0}")]
    Connect(String),

    /// Free-form failure; the text is shown to the user as-is and may be empty.
    #[error("{0}")]
    Failed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Human-readable message, or `None` when the failure carries none.
    pub fn message(&self) -> Option<String> {
        let message = self.to_string();
        (!message.trim().is_empty()).then_some(message)
    }
}

/// Errors related to loading a recorded run.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Event log not found at {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read event log at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ReplayError> for TransportError {
    fn from(e: ReplayError) -> Self {
        TransportError::Failed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cancelled_is_cancellation() {
        assert!(TransportError::Cancelled.is_cancellation());
        assert!(!TransportError::Failed("x".into()).is_cancellation());
        assert!(!TransportError::Connect("refused".into()).is_cancellation());
    }

    #[test]
    fn empty_failure_has_no_message() {
        assert_eq!(TransportError::Failed(String::new()).message(), None);
        assert_eq!(TransportError::Failed("  ".into()).message(), None);
        assert_eq!(
            TransportError::Failed("upstream 502".into()).message().as_deref(),
            Some("upstream 502")
        );
        assert_eq!(
            TransportError::Connect("refused".into()).message().as_deref(),
            Some("Failed to connect to agent: refused")
        );
    }

    #[test]
    fn replay_errors_become_failures() {
        let err: TransportError = ReplayError::NotFound {
            path: PathBuf::from("/tmp/missing.jsonl"),
        }
        .into();
        assert_eq!(
            err.message().as_deref(),
            Some("Event log not found at /tmp/missing.jsonl")
        );
    }
}
