use anyhow::{Context, Result};
use smol::process::Command;

/// Run cargo with inherited stdio and report whether it exited cleanly
pub async fn run(args: &[&str]) -> Result<bool> {
    println!("$ cargo {}", args.join(" "));

    let status = Command::new("cargo")
        .args(args)
        .status()
        .await
        .with_context(|| format!("Failed to run cargo {}", args.join(" ")))?;

    Ok(status.success())
}

/// Whether a cargo subcommand is installed
pub async fn has_subcommand(name: &str) -> bool {
    Command::new("cargo")
        .args([name, "--version"])
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
