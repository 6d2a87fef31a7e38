use std::time::Duration;

use tagtrail_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Why one tag of a batch was left untouched.
#[derive(Debug, Error)]
pub enum TagFailure {
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("store error: {0:#}")]
    Store(anyhow::Error),
    #[error("malformed input: {0}")]
    Malformed(DomainError),
    #[error("conflict: {0}")]
    Conflict(DomainError),
}

impl TagFailure {
    /// Classifies a failed tag commit.
    pub fn from_store(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(conflict @ DomainError::AlreadyProcessed { .. }) => TagFailure::Conflict(conflict),
            Ok(other) => TagFailure::Store(other.into()),
            Err(err) => TagFailure::Store(err),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TagFailure::Timeout(_) => "timeout",
            TagFailure::Store(_) => "store",
            TagFailure::Malformed(_) => "malformed",
            TagFailure::Conflict(_) => "conflict",
        }
    }

    /// A retryable tag is picked up again by the next batch unchanged.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TagFailure::Malformed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_processed_is_a_conflict() {
        let err = anyhow::Error::new(DomainError::AlreadyProcessed { expected: 3, updated: 1 });
        let failure = TagFailure::from_store(err);
        assert_eq!(failure.kind(), "conflict");
        assert!(failure.is_retryable());
    }

    #[test]
    fn other_errors_are_store_failures() {
        let failure = TagFailure::from_store(anyhow::anyhow!("connection reset"));
        assert_eq!(failure.kind(), "store");
        assert!(failure.to_string().contains("connection reset"));
    }

    #[test]
    fn malformed_input_is_not_retryable() {
        let failure = TagFailure::Malformed(DomainError::SegmentTooShort {
            tag_id: "TAG".to_string(),
            reads: 1,
        });
        assert!(!failure.is_retryable());
    }
}
