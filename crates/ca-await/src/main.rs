//! `ca-await`: wait for certificate authorities and other provisioned
//! services to answer their health endpoint.

use anyhow::Result;
use availability::DEFAULT_HEALTH_PATH;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod report;

use report::OutputFormat;

#[derive(Parser)]
#[command(name = "ca-await")]
#[command(about = "Wait for certificate authorities and other services to come online")]
#[command(version)]
struct Cli {
    /// Target file path
    #[arg(short, long, global = true, default_value = "targets.yaml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the target file
    Validate {
        /// Strict mode - fail on missing environment variables
        #[arg(short, long)]
        strict: bool,
    },

    /// Wait for targets from the target file
    Wait {
        /// Targets to wait for (empty means all)
        targets: Vec<String>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Wait for a single endpoint without a target file
    Check {
        /// Endpoint base URL, e.g. https://localhost:7054
        url: String,

        /// Per-request timeout in seconds
        #[arg(short, long, default_value_t = 5)]
        timeout: u64,

        /// Overall deadline in seconds
        #[arg(short, long, default_value_t = 60)]
        deadline: u64,

        /// Health path appended to the URL
        #[arg(short, long, default_value = DEFAULT_HEALTH_PATH)]
        path: String,

        /// Skip TLS certificate validation (test networks only)
        #[arg(long)]
        insecure: bool,

        /// PEM file to trust as an extra root certificate
        #[arg(long)]
        ca_cert: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins, then `--verbose`, then the target file's log level.
pub(crate) fn init_tracing(verbose: bool, log_level: Option<&str>) {
    let default_level = if verbose {
        "debug"
    } else {
        log_level.unwrap_or("info")
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { strict } => {
            commands::validate::run(&cli.config, strict, cli.verbose).await
        }
        Commands::Wait { targets, format } => {
            commands::wait::run(&cli.config, targets, format, cli.verbose).await
        }
        Commands::Check {
            url,
            timeout,
            deadline,
            path,
            insecure,
            ca_cert,
            format,
        } => {
            init_tracing(cli.verbose, None);
            let args = commands::check::CheckArgs {
                url,
                timeout,
                deadline,
                path,
                insecure,
                ca_cert,
            };
            commands::check::run(args, format).await
        }
    }
}
