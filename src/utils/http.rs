// src/utils/http.rs
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use tracing::{debug, warn};

use crate::config::HttpConfig;

/// Shared HTTP client handed to plugins that talk to web services. Cheap to
/// clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(user_agent: Option<String>, timeout_secs: Option<u64>) -> Result<Self> {
        Self::with_options(user_agent, timeout_secs, false)
    }

    fn with_options(
        user_agent: Option<String>,
        timeout_secs: Option<u64>,
        insecure_skip_tls_verify: bool,
    ) -> Result<Self> {
        let user_agent =
            user_agent.unwrap_or_else(|| format!("riptide/{}", env!("CARGO_PKG_VERSION")));
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(30));

        let mut builder = Client::builder().timeout(timeout).user_agent(&user_agent);
        if insecure_skip_tls_verify {
            warn!("TLS certificate validation disabled by configuration");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self { client, user_agent })
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Self::with_options(
            Some(config.user_agent.clone()),
            Some(config.timeout_secs),
            config.insecure_skip_tls_verify,
        )
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);

        self.client
            .get(url)
            .send()
            .await
            .context(format!("Failed to GET {}", url))
    }

    /// Get the user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
