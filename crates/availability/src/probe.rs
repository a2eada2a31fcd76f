//! Health probes.
//!
//! A probe issues one request with a timeout and reports the status code
//! it got back. Deciding whether that status means "ready" is left to the
//! poller.

use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Health path served by Fabric CAs
pub const DEFAULT_HEALTH_PATH: &str = "/cainfo";

/// A single-request health check
#[async_trait]
pub trait Probe: Send + Sync {
    /// URL being probed, for logging and reports
    fn url(&self) -> &str;

    /// Issue one request.
    ///
    /// Returns the response status, [`Error::Timeout`] when the request
    /// did not finish within `timeout`, or [`Error::Transport`] for any
    /// other connection failure.
    async fn probe(&self, timeout: Duration) -> Result<u16>;
}

/// Options for [`HttpProbe`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpProbeOptions {
    /// Path appended to the endpoint; empty probes the endpoint itself
    pub health_path: String,
    /// Skip TLS certificate validation. Test environments only.
    pub accept_invalid_certs: bool,
    /// Extra PEM trust root, e.g. a test CA's self-signed certificate
    pub ca_certificate: Option<PathBuf>,
}

impl Default for HttpProbeOptions {
    fn default() -> Self {
        Self {
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            accept_invalid_certs: false,
            ca_certificate: None,
        }
    }
}

/// Probe issuing `GET <endpoint><health_path>` over reqwest
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: Url,
}

impl HttpProbe {
    /// Build a probe for `endpoint` with the given options
    pub fn new(endpoint: &str, options: &HttpProbeOptions) -> Result<Self> {
        let url = health_url(endpoint, &options.health_path)?;
        let mut builder = reqwest::Client::builder();

        if let Some(path) = &options.ca_certificate {
            let pem = std::fs::read(path)?;
            let certificate = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                Error::configuration(format!(
                    "Invalid CA certificate {}: {}",
                    path.display(),
                    e
                ))
            })?;
            debug!("Trusting CA certificate {}", path.display());
            builder = builder.add_root_certificate(certificate);
        }

        if options.accept_invalid_certs {
            warn!(
                "TLS certificate validation disabled for {}; use only against test networks",
                url
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn probe(&self, timeout: Duration) -> Result<u16> {
        match self.client.get(self.url.clone()).timeout(timeout).send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(e) if e.is_timeout() => Err(Error::Timeout(timeout)),
            Err(e) => Err(Error::transport(error_chain(&e))),
        }
    }
}

/// Join an endpoint and a health path into the URL to probe
pub fn health_url(endpoint: &str, health_path: &str) -> Result<Url> {
    let base = Url::parse(endpoint)
        .map_err(|e| Error::configuration(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

    if !matches!(base.scheme(), "http" | "https") {
        return Err(Error::configuration(format!(
            "Unsupported scheme '{}' in endpoint '{}'",
            base.scheme(),
            endpoint
        )));
    }

    if health_path.is_empty() {
        return Ok(base);
    }

    // Join on the path only so a query or fragment on the endpoint stays put
    let path = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        health_path.trim_start_matches('/')
    );
    let mut url = base;
    url.set_path(&path);
    Ok(url)
}

// reqwest's Display stops at the outermost layer ("error sending request");
// the useful part (connection refused, dns failure) is in the source chain.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
