//! Time source used by the poller.
//!
//! The poller never reads the wall clock directly, so its deadline
//! arithmetic can be driven by a manual clock in tests.

use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Source of monotonic time and delays
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;

    /// Wait for the given duration
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by `Instant::now` and an `async-io` timer.
///
/// The timer runs on async-io's own reactor, so this works under smol,
/// tokio or a plain `block_on`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        async_io::Timer::after(duration).await;
    }
}
