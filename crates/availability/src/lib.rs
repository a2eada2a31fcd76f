//! # Availability
//!
//! Wait for a freshly provisioned service to come online.
//!
//! The poller repeatedly probes an HTTP health endpoint (by default a
//! certificate authority's `/cainfo`) until it answers with a success
//! status or an overall deadline passes. Request timeouts count as "not
//! ready yet"; other failures end the poll unless a [`RetryPolicy`]
//! opts in to retrying them.
//!
//! ## Example
//!
//! ```no_run
//! use availability::{AvailabilityPoller, HttpProbe, HttpProbeOptions, PollConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> availability::Result<()> {
//! let probe = HttpProbe::new("https://localhost:7054", &HttpProbeOptions::default())?;
//! let config = PollConfig::new(Duration::from_secs(2), Duration::from_secs(60));
//!
//! let elapsed = AvailabilityPoller::new(probe, config).poll().await.into_result()?;
//! println!("CA ready after {:?}", elapsed);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]

mod clock;
mod config;
mod error;
mod poller;
mod probe;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use config::{PollConfig, RetryPolicy};
pub use error::{Error, Result};
pub use poller::{AvailabilityPoller, PollOutcome, await_availability};
pub use probe::{DEFAULT_HEALTH_PATH, HttpProbe, HttpProbeOptions, Probe, health_url};

pub use tokio_util::sync::CancellationToken;
