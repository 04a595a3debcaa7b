use thiserror::Error;

#[derive(Error, Debug)]
pub enum SprintboardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Remote error: {message}")]
    Remote { message: String },

    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SprintboardError {
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Whether the error came from the data store rather than from local checks.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Unauthenticated(_))
    }
}

impl From<serde_json::Error> for SprintboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_is_displayed() {
        let err = SprintboardError::remote("row violates policy");
        assert_eq!(err.to_string(), "Remote error: row violates policy");
        assert!(err.is_remote());
    }

    #[test]
    fn test_local_errors_are_not_remote() {
        assert!(!SprintboardError::NotFound("sprint".into()).is_remote());
        assert!(!SprintboardError::Duplicate("column".into()).is_remote());
    }
}
