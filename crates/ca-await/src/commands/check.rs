use crate::report::{self, OutputFormat, TargetReport};
use anyhow::Result;
use availability::{AvailabilityPoller, HttpProbe, HttpProbeOptions, PollConfig, health_url};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments of the `check` command
pub struct CheckArgs {
    pub url: String,
    pub timeout: u64,
    pub deadline: u64,
    pub path: String,
    pub insecure: bool,
    pub ca_cert: Option<PathBuf>,
}

pub async fn run(args: CheckArgs, format: OutputFormat) -> Result<()> {
    let options = HttpProbeOptions {
        health_path: args.path,
        accept_invalid_certs: args.insecure,
        ca_certificate: args.ca_cert,
    };
    let config = PollConfig::new(
        Duration::from_secs(args.timeout),
        Duration::from_secs(args.deadline),
    );

    let url = health_url(&args.url, &options.health_path)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| args.url.clone());

    let report = match HttpProbe::new(&args.url, &options) {
        Ok(probe) => {
            let outcome = AvailabilityPoller::new(probe, config).poll().await;
            TargetReport::from_outcome(&args.url, url, outcome)
        }
        Err(e) => TargetReport::from_error(&args.url, url, &e),
    };

    let reports = [report];
    report::print(&reports, format)?;
    report::ensure_all_ready(&reports)
}
