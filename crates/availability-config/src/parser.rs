//! Configuration parser with environment variable substitution

use crate::{
    Config, ConfigError, DEFAULT_DEADLINE_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETRY_INTERVAL_MS, Result, TargetDef,
};
use availability::{
    DEFAULT_HEALTH_PATH, HttpProbe, HttpProbeOptions, PollConfig, RetryPolicy, health_url,
};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A fully resolved target, ready to poll
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Target name
    pub name: String,
    /// Endpoint after variable substitution
    pub endpoint: String,
    /// Poll timings and retry policy
    pub poll: PollConfig,
    /// HTTP probe options
    pub probe: HttpProbeOptions,
}

impl Target {
    /// Build the HTTP probe for this target
    pub fn http_probe(&self) -> availability::Result<HttpProbe> {
        HttpProbe::new(&self.endpoint, &self.probe)
    }

    /// URL that will be probed
    pub fn health_url(&self) -> String {
        health_url(&self.endpoint, &self.probe.health_path)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| self.endpoint.clone())
    }
}

/// Parse a YAML configuration file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parse YAML configuration from a string
pub fn parse_str(content: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    // Check version
    if config.version != "1.0" {
        return Err(ConfigError::ValidationError(format!(
            "Unsupported version: {}, expected 1.0",
            config.version
        )));
    }

    if config.targets.is_empty() {
        return Err(ConfigError::ValidationError("No targets defined".to_string()));
    }

    for (name, def) in &config.targets {
        poll_config(config, name, def)?;

        // URLs with unresolved variables are checked when the target is resolved
        if !def.url.contains("${") {
            let path = health_path(config, def);
            health_url(&def.url, &path).map_err(|source| ConfigError::InvalidTarget {
                name: name.clone(),
                source,
            })?;
        }
    }

    Ok(())
}

/// Resolve one target by name, substituting environment variables
pub fn resolve_target(config: &Config, name: &str) -> Result<Target> {
    let def = config
        .targets
        .get(name)
        .ok_or_else(|| ConfigError::TargetNotFound(name.to_string()))?;

    let endpoint = substitute_env_vars(&def.url)?;
    let probe = HttpProbeOptions {
        health_path: health_path(config, def),
        accept_invalid_certs: def.accept_invalid_certs,
        ca_certificate: def
            .ca_certificate
            .as_deref()
            .map(substitute_env_vars)
            .transpose()?
            .map(PathBuf::from),
    };

    health_url(&endpoint, &probe.health_path).map_err(|source| ConfigError::InvalidTarget {
        name: name.to_string(),
        source,
    })?;

    Ok(Target {
        name: name.to_string(),
        endpoint,
        poll: poll_config(config, name, def)?,
        probe,
    })
}

/// Resolve the named targets, or every target in name order when `names` is empty
pub fn resolve_targets(config: &Config, names: &[String]) -> Result<Vec<Target>> {
    if names.is_empty() {
        config
            .targets
            .keys()
            .map(|name| resolve_target(config, name))
            .collect()
    } else {
        names
            .iter()
            .map(|name| resolve_target(config, name))
            .collect()
    }
}

/// Environment variables referenced without a default and not currently set
pub fn missing_env_vars(config: &Config) -> Result<Vec<String>> {
    let re = var_pattern()?;
    let mut missing = Vec::new();

    for def in config.targets.values() {
        let fields = std::iter::once(def.url.as_str()).chain(def.ca_certificate.as_deref());
        for field in fields {
            for cap in re.captures_iter(field) {
                let var_expr = &cap[1];
                if var_expr.contains(":-") {
                    continue;
                }
                if std::env::var(var_expr).is_err() && !missing.iter().any(|m| m == var_expr) {
                    missing.push(var_expr.to_string());
                }
            }
        }
    }

    Ok(missing)
}

/// Substitute environment variables in a string
pub fn substitute_env_vars(input: &str) -> Result<String> {
    substitute_vars(input, |name| std::env::var(name).ok())
}

/// Substitute `${VAR}` and `${VAR:-default}` using `lookup`
pub fn substitute_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    let re = var_pattern()?;
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in re.captures_iter(input) {
        let full_match = &cap[0];
        let var_expr = &cap[1];

        // Handle default values: ${VAR:-default}
        let (var_name, default_value) = match var_expr.find(":-") {
            Some(pos) => (&var_expr[..pos], Some(&var_expr[pos + 2..])),
            None => (var_expr, None),
        };

        match lookup(var_name) {
            Some(value) => result = result.replace(full_match, &value),
            None => match default_value {
                Some(default) => result = result.replace(full_match, default),
                None => errors.push(var_name.to_string()),
            },
        }
    }

    if !errors.is_empty() {
        return Err(ConfigError::EnvVarNotFound(errors.join(", ")));
    }

    Ok(result)
}

fn var_pattern() -> Result<Regex> {
    Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ValidationError(e.to_string()))
}

fn health_path(config: &Config, def: &TargetDef) -> String {
    def.health_path
        .clone()
        .or_else(|| config.settings.health_path.clone())
        .unwrap_or_else(|| DEFAULT_HEALTH_PATH.to_string())
}

fn poll_config(config: &Config, name: &str, def: &TargetDef) -> Result<PollConfig> {
    let request_timeout = def
        .request_timeout
        .or(config.settings.request_timeout)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    let deadline = def
        .deadline
        .or(config.settings.deadline)
        .unwrap_or(DEFAULT_DEADLINE_SECS);

    let mut poll = PollConfig::new(
        Duration::from_secs(request_timeout),
        Duration::from_secs(deadline),
    );
    poll.expected_status = def.expected_status;

    if let Some(retry) = &def.retry {
        poll.retry = RetryPolicy {
            transport_errors: retry.transport_errors,
            unexpected_status: retry.unexpected_status,
            interval: Duration::from_millis(
                retry.interval_ms.unwrap_or(DEFAULT_RETRY_INTERVAL_MS),
            ),
        };
    }

    poll.validate().map_err(|source| ConfigError::InvalidTarget {
        name: name.to_string(),
        source,
    })?;

    Ok(poll)
}
