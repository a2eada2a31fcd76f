use crate::cargo;
use anyhow::{Result, bail};
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct CiArgs {
    #[command(subcommand)]
    cmd: CiCommand,
}

#[derive(Subcommand)]
pub enum CiCommand {
    /// Run all CI checks
    All,
    /// Format check (read-only)
    #[command(name = "fmt-check")]
    FmtCheck,
    /// Clippy lints
    Clippy,
    /// Cargo deny check
    Deny,
    /// Run unit tests only (lib and bin targets)
    UnitTests,
    /// Run unit, integration and CLI tests
    IntegrationTests,
}

pub async fn run(args: CiArgs) -> Result<()> {
    match args.cmd {
        CiCommand::All => run_all().await,
        CiCommand::FmtCheck => run_fmt().await,
        CiCommand::Clippy => run_clippy().await,
        CiCommand::Deny => run_deny().await,
        CiCommand::UnitTests => run_unit_tests().await,
        CiCommand::IntegrationTests => run_integration_tests().await,
    }
}

async fn run_all() -> Result<()> {
    println!("Running all CI checks\n");

    println!("Checking code formatting...");
    run_fmt().await?;
    println!("Format check passed\n");

    println!("Running clippy lints...");
    run_clippy().await?;
    println!("Clippy check passed\n");

    if cargo::has_subcommand("deny").await {
        println!("Running cargo deny...");
        run_deny().await?;
        println!("Dependency check passed\n");
    }

    println!("Running unit tests...");
    run_unit_tests().await?;
    println!("Unit tests passed\n");

    println!("Running integration tests...");
    run_integration_tests().await?;
    println!("Integration tests passed\n");

    println!("All CI checks passed!");
    Ok(())
}

async fn run_fmt() -> Result<()> {
    if !cargo::run(&["fmt", "--all", "--", "--check"]).await? {
        bail!("Format check failed. Run 'cargo fmt --all' to fix.");
    }
    Ok(())
}

async fn run_clippy() -> Result<()> {
    let args = [
        "clippy",
        "--workspace",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ];
    if !cargo::run(&args).await? {
        bail!("Clippy check failed");
    }
    Ok(())
}

async fn run_deny() -> Result<()> {
    if !cargo::run(&["deny", "check"]).await? {
        bail!("Cargo deny check failed");
    }
    Ok(())
}

async fn run_unit_tests() -> Result<()> {
    if !cargo::run(&["test", "--workspace", "--lib", "--bins"]).await? {
        bail!("Unit tests failed");
    }
    Ok(())
}

async fn run_integration_tests() -> Result<()> {
    // HTTP and CLI tests bind loopback sockets only
    if !cargo::run(&["test", "--workspace", "--all-features"]).await? {
        bail!("Integration tests failed");
    }
    Ok(())
}
