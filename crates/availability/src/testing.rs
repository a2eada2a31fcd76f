//! Deterministic clock and scripted probe for exercising the poller
//! without a network or real delays.

use crate::{Clock, Error, Probe, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, duration: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += duration;
    }

    /// Time advanced since creation
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// One scripted probe response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Consume the full request timeout, then time out
    Timeout,
    /// Fail immediately with a transport error
    Transport(String),
    /// Answer immediately with this status
    Status(u16),
    /// Answer with this status after the given latency
    SlowStatus(u16, Duration),
    /// Never answer
    Hang,
}

#[derive(Debug)]
struct ScriptState {
    steps: VecDeque<Step>,
    last: Option<Step>,
}

/// Probe replaying a fixed list of responses against a [`ManualClock`].
///
/// The last step repeats once the script runs out.
#[derive(Debug, Clone)]
pub struct ScriptedProbe {
    clock: ManualClock,
    state: Arc<Mutex<ScriptState>>,
    calls: Arc<AtomicU32>,
}

impl ScriptedProbe {
    /// Create a probe replaying `steps`
    pub fn new(clock: ManualClock, steps: Vec<Step>) -> Self {
        Self {
            clock,
            state: Arc::new(Mutex::new(ScriptState {
                steps: steps.into(),
                last: None,
            })),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Number of requests issued so far
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Option<Step> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.steps.pop_front() {
            Some(step) => {
                state.last = Some(step.clone());
                Some(step)
            }
            None => state.last.clone(),
        }
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    fn url(&self) -> &str {
        "http://scripted.test/cainfo"
    }

    async fn probe(&self, timeout: Duration) -> Result<u16> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_step() {
            Some(Step::Timeout) => {
                self.clock.advance(timeout);
                Err(Error::Timeout(timeout))
            }
            Some(Step::Transport(message)) => Err(Error::Transport(message)),
            Some(Step::Status(status)) => Ok(status),
            Some(Step::SlowStatus(status, latency)) if latency < timeout => {
                self.clock.advance(latency);
                Ok(status)
            }
            Some(Step::SlowStatus(..)) => {
                self.clock.advance(timeout);
                Err(Error::Timeout(timeout))
            }
            Some(Step::Hang) => futures::future::pending::<Result<u16>>().await,
            None => Err(Error::transport("probe script is empty")),
        }
    }
}
