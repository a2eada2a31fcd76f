//! Error types for availability polling

use std::time::Duration;
use thiserror::Error;

/// Result type alias for availability operations
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a poll short of a ready endpoint
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid poller inputs (bad URL, non-positive or inverted timings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single request did not complete within its timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection failure other than a timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint answered, but not with a success status
    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus {
        /// HTTP status code received
        status: u16,
        /// URL that was probed
        url: String,
    },

    /// The overall deadline elapsed without a ready response
    #[error("Deadline of {deadline:?} exceeded after {attempts} attempt(s)")]
    DeadlineExceeded {
        /// Overall deadline that was configured
        deadline: Duration,
        /// Requests issued before giving up
        attempts: u32,
    },

    /// The poll was cancelled by its caller
    #[error("Poll cancelled")]
    Cancelled,

    /// IO error (reading TLS material)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Whether this is a per-request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Whether this is a non-timeout transport failure
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether this is a non-success status
    pub fn is_unexpected_status(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { .. })
    }

    /// Whether the overall deadline ran out
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnexpectedStatus {
            status: 503,
            url: "http://localhost:7054/cainfo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected status 503 from http://localhost:7054/cainfo"
        );

        let err = Error::DeadlineExceeded {
            deadline: Duration::from_secs(3),
            attempts: 3,
        };
        assert_eq!(err.to_string(), "Deadline of 3s exceeded after 3 attempt(s)");
    }

    #[test]
    fn test_error_kinds() {
        assert!(Error::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(Error::transport("connection refused").is_transport());
        assert!(!Error::transport("connection refused").is_timeout());
        assert!(
            Error::DeadlineExceeded {
                deadline: Duration::from_secs(1),
                attempts: 1
            }
            .is_deadline_exceeded()
        );
    }
}
