use anyhow::{Context, Result, bail};
use availability_config::parser;
use std::path::Path;

pub async fn run(config_path: &Path, strict: bool, verbose: bool) -> Result<()> {
    println!("Validating {}...", config_path.display());

    let config = parser::parse_file(config_path).context("Failed to parse configuration")?;
    crate::init_tracing(verbose, config.settings.log_level.as_deref());

    // Structure and timings are checked during parsing
    println!("✓ Configuration valid");
    println!("  Version: {}", config.version);

    if let Some(name) = &config.name {
        println!("  Name: {}", name);
    }

    println!("  Targets: {}", config.targets.len());
    for (name, target) in &config.targets {
        println!("    {} -> {}", name, target.url);
        if target.accept_invalid_certs {
            println!("      ⚠ TLS certificate validation disabled");
        }
    }

    let missing = parser::missing_env_vars(&config)?;
    if !missing.is_empty() {
        if strict {
            bail!(
                "Undefined environment variables referenced: {}",
                missing.join(", ")
            );
        }
        println!(
            "  ⚠ References undefined environment variables: {}",
            missing.join(", ")
        );
        return Ok(());
    }

    // Every variable is defined, so every target must resolve
    parser::resolve_targets(&config, &[]).context("Failed to resolve targets")?;

    Ok(())
}
