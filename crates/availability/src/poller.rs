//! Bounded-deadline availability polling.
//!
//! The poller issues one request at a time until the endpoint answers with
//! a success status, the overall deadline passes, or a fatal error occurs.
//! Request timeouts only mean "not ready yet" and are retried immediately.
//! Any other failure ends the poll unless the [`RetryPolicy`] opts in.
//!
//! [`RetryPolicy`]: crate::RetryPolicy

use crate::{Clock, Error, HttpProbe, HttpProbeOptions, PollConfig, Probe, Result, SystemClock};
use futures::future::{Either, select};
use futures::pin_mut;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of one poll
#[derive(Debug)]
pub struct PollOutcome {
    /// Whether a success status was observed
    pub succeeded: bool,
    /// Time from the first request to the end of the poll
    pub elapsed: Duration,
    /// Requests issued
    pub attempts: u32,
    /// Why the poll failed; `None` on success
    pub last_error: Option<Error>,
}

impl PollOutcome {
    pub(crate) fn ready(elapsed: Duration, attempts: u32) -> Self {
        Self {
            succeeded: true,
            elapsed,
            attempts,
            last_error: None,
        }
    }

    pub(crate) fn failed(elapsed: Duration, attempts: u32, error: Error) -> Self {
        Self {
            succeeded: false,
            elapsed,
            attempts,
            last_error: Some(error),
        }
    }

    /// Elapsed time on success, the failure otherwise
    pub fn into_result(self) -> Result<Duration> {
        match self.last_error {
            None if self.succeeded => Ok(self.elapsed),
            Some(error) => Err(error),
            None => Err(Error::Cancelled),
        }
    }
}

/// Polls a [`Probe`] until it reports a ready endpoint
pub struct AvailabilityPoller<P, C = SystemClock> {
    probe: P,
    clock: C,
    config: PollConfig,
}

impl<P: Probe> AvailabilityPoller<P, SystemClock> {
    /// Create a poller on the system clock
    pub fn new(probe: P, config: PollConfig) -> Self {
        Self::with_clock(probe, config, SystemClock)
    }
}

impl<P: Probe, C: Clock> AvailabilityPoller<P, C> {
    /// Create a poller on a custom clock
    pub fn with_clock(probe: P, config: PollConfig, clock: C) -> Self {
        Self {
            probe,
            clock,
            config,
        }
    }

    /// The poll configuration
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// The probe being polled
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Poll until ready, failed or out of time
    pub async fn poll(&self) -> PollOutcome {
        self.poll_until_cancelled(&CancellationToken::new()).await
    }

    /// Poll like [`poll`](Self::poll), stopping early once `cancel` fires
    pub async fn poll_until_cancelled(&self, cancel: &CancellationToken) -> PollOutcome {
        if let Err(e) = self.config.validate() {
            return PollOutcome::failed(Duration::ZERO, 0, e);
        }

        let url = self.probe.url();
        let start = self.clock.now();
        let Some(deadline) = start.checked_add(self.config.deadline) else {
            return PollOutcome::failed(
                Duration::ZERO,
                0,
                Error::configuration(format!(
                    "deadline {:?} is too large to schedule",
                    self.config.deadline
                )),
            );
        };
        let mut attempts = 0u32;
        let mut last_retried = None;

        loop {
            if cancel.is_cancelled() {
                debug!("Poll of {} cancelled after {} attempt(s)", url, attempts);
                return PollOutcome::failed(self.elapsed_since(start), attempts, Error::Cancelled);
            }

            let remaining = deadline.saturating_duration_since(self.clock.now());
            if remaining.is_zero() {
                break;
            }

            let timeout = self.config.request_timeout.min(remaining);
            attempts += 1;
            debug!("Probing {} (attempt {}, timeout {:?})", url, attempts, timeout);

            let result = {
                let request = self.probe.probe(timeout);
                let cancelled = cancel.cancelled();
                pin_mut!(request, cancelled);
                match select(request, cancelled).await {
                    Either::Left((result, _)) => result,
                    Either::Right(_) => {
                        debug!("Poll of {} cancelled during request", url);
                        return PollOutcome::failed(
                            self.elapsed_since(start),
                            attempts,
                            Error::Cancelled,
                        );
                    }
                }
            };

            let error = match result {
                Ok(status) if self.config.is_success(status) => {
                    let elapsed = self.elapsed_since(start);
                    info!(
                        "{} is available (status {}) after {:?} and {} attempt(s)",
                        url, status, elapsed, attempts
                    );
                    return PollOutcome::ready(elapsed, attempts);
                }
                Ok(status) => Error::UnexpectedStatus {
                    status,
                    url: url.to_string(),
                },
                Err(e) => e,
            };

            if error.is_timeout() {
                debug!("{} not ready yet: {}", url, error);
                continue;
            }

            if !self.config.retry.retries(&error) {
                warn!("Polling {} failed: {}", url, error);
                return PollOutcome::failed(self.elapsed_since(start), attempts, error);
            }

            debug!("{} not ready, retrying: {}", url, error);
            last_retried = Some(error);

            let remaining = deadline.saturating_duration_since(self.clock.now());
            if remaining.is_zero() {
                break;
            }

            let pause = self.clock.sleep(self.config.retry.interval.min(remaining));
            let cancelled = cancel.cancelled();
            pin_mut!(pause, cancelled);
            if let Either::Right(_) = select(pause, cancelled).await {
                debug!("Poll of {} cancelled while waiting to retry", url);
                return PollOutcome::failed(self.elapsed_since(start), attempts, Error::Cancelled);
            }
        }

        let elapsed = self.elapsed_since(start);
        match &last_retried {
            Some(e) => warn!(
                "{} not available within {:?} ({} attempt(s)), last error: {}",
                url, self.config.deadline, attempts, e
            ),
            None => warn!(
                "{} not available within {:?} ({} attempt(s))",
                url, self.config.deadline, attempts
            ),
        }
        PollOutcome::failed(
            elapsed,
            attempts,
            Error::DeadlineExceeded {
                deadline: self.config.deadline,
                attempts,
            },
        )
    }

    fn elapsed_since(&self, start: std::time::Instant) -> Duration {
        self.clock.now().saturating_duration_since(start)
    }
}

/// Wait for `GET <endpoint>/cainfo` to answer with a 2xx status.
///
/// Invalid inputs fail fast with [`Error::Configuration`] and no request.
pub async fn await_availability(
    endpoint: &str,
    request_timeout: Duration,
    deadline: Duration,
) -> PollOutcome {
    let config = PollConfig::new(request_timeout, deadline);
    if let Err(e) = config.validate() {
        return PollOutcome::failed(Duration::ZERO, 0, e);
    }

    match HttpProbe::new(endpoint, &HttpProbeOptions::default()) {
        Ok(probe) => AvailabilityPoller::new(probe, config).poll().await,
        Err(e) => PollOutcome::failed(Duration::ZERO, 0, e),
    }
}
