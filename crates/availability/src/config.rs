//! Poll timing and retry configuration

use crate::{Error, Result};
use std::time::{Duration, Instant};

/// Which non-timeout failures are retried instead of ending the poll.
///
/// Both classes are fatal by default: a refused connection or a bad
/// status stops the poll on the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retry connection failures other than timeouts
    pub transport_errors: bool,
    /// Retry non-success status codes
    pub unexpected_status: bool,
    /// Pause between a retried failure and the next request
    pub interval: Duration,
}

impl RetryPolicy {
    /// Policy that retries every error class
    pub fn retry_all(interval: Duration) -> Self {
        Self {
            transport_errors: true,
            unexpected_status: true,
            interval,
        }
    }

    /// Whether the given error should be retried under this policy
    pub fn retries(&self, error: &Error) -> bool {
        match error {
            Error::Timeout(_) => true,
            Error::Transport(_) => self.transport_errors,
            Error::UnexpectedStatus { .. } => self.unexpected_status,
            _ => false,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            transport_errors: false,
            unexpected_status: false,
            interval: Duration::from_secs(1),
        }
    }
}

/// Timings and success criteria for a single poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Timeout applied to each request
    pub request_timeout: Duration,
    /// Overall budget for the whole poll
    pub deadline: Duration,
    /// Exact status to accept; any 2xx when `None`
    pub expected_status: Option<u16>,
    /// Handling of non-timeout failures
    pub retry: RetryPolicy,
}

impl PollConfig {
    /// Create a config accepting any 2xx status with the default retry policy
    pub fn new(request_timeout: Duration, deadline: Duration) -> Self {
        Self {
            request_timeout,
            deadline,
            expected_status: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Accept only the given status code
    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    /// Replace the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Check the timing rules: both positive, request timeout below the deadline
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(Error::configuration("request timeout must be positive"));
        }
        if self.deadline.is_zero() {
            return Err(Error::configuration("deadline must be positive"));
        }
        if Instant::now().checked_add(self.deadline).is_none() {
            return Err(Error::configuration(format!(
                "deadline {:?} is too large",
                self.deadline
            )));
        }
        if self.request_timeout >= self.deadline {
            return Err(Error::configuration(format!(
                "request timeout {:?} must be shorter than deadline {:?}",
                self.request_timeout, self.deadline
            )));
        }
        if let Some(status) = self.expected_status {
            if !(100..=599).contains(&status) {
                return Err(Error::configuration(format!(
                    "expected status {} is not a valid HTTP status",
                    status
                )));
            }
        }
        if (self.retry.transport_errors || self.retry.unexpected_status)
            && self.retry.interval.is_zero()
        {
            return Err(Error::configuration(
                "retry interval must be positive when retries are enabled",
            ));
        }
        Ok(())
    }

    /// Whether a status code counts as ready
    pub fn is_success(&self, status: u16) -> bool {
        match self.expected_status {
            Some(expected) => status == expected,
            None => (200..300).contains(&status),
        }
    }
}
