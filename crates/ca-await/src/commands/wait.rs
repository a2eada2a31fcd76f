use crate::report::{self, OutputFormat, TargetReport};
use anyhow::{Context, Result};
use availability::{AvailabilityPoller, CancellationToken};
use availability_config::{Target, parser};
use futures::future::join_all;
use std::path::Path;
use tracing::{info, warn};

pub async fn run(
    config_path: &Path,
    names: Vec<String>,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let config = parser::parse_file(config_path).context("Failed to parse configuration")?;
    crate::init_tracing(verbose, config.settings.log_level.as_deref());

    let targets = parser::resolve_targets(&config, &names).context("Failed to resolve targets")?;

    // Ctrl-C cancels every outstanding poll
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling outstanding polls");
                cancel.cancel();
            }
        })
    };

    info!("Waiting for {} target(s)", targets.len());
    let reports = join_all(targets.iter().map(|target| poll_target(target, &cancel))).await;
    interrupt.abort();

    report::print(&reports, format)?;
    report::ensure_all_ready(&reports)
}

async fn poll_target(target: &Target, cancel: &CancellationToken) -> TargetReport {
    let url = target.health_url();

    match target.http_probe() {
        Ok(probe) => {
            info!(
                "Waiting up to {:?} for {} at {}",
                target.poll.deadline, target.name, url
            );
            let outcome = AvailabilityPoller::new(probe, target.poll.clone())
                .poll_until_cancelled(cancel)
                .await;
            TargetReport::from_outcome(&target.name, url, outcome)
        }
        Err(e) => {
            warn!("Cannot poll {}: {}", target.name, e);
            TargetReport::from_error(&target.name, url, &e)
        }
    }
}
