//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid status transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: String,
        to: String,
    },

    #[error("Unknown status: {0}")]
    UnknownStatus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_display() {
        let error = DomainError::UnknownStatus("bogus".to_string());
        assert_eq!(error.to_string(), "Unknown status: bogus");
    }

    #[test]
    fn test_transition_display() {
        let error = DomainError::InvalidTransition {
            id: "abc-1".to_string(),
            from: "completed".to_string(),
            to: "executing".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid status transition for abc-1: completed -> executing"
        );
    }
}
