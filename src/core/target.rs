// src/core/target.rs
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{RiptideError, RiptideResult};

use super::network::{NetworkEndpoint, NetworkService, ServiceContext, Transport};

/// What the scan workflow is pointed at. For URI targets the service is
/// already known from the URI itself, so the workflow seeds the
/// reconnaissance report with it instead of port scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTarget {
    pub endpoint: NetworkEndpoint,
    pub seed_service: Option<NetworkService>,
}

impl ScanTarget {
    pub fn for_endpoint(endpoint: NetworkEndpoint) -> Self {
        Self {
            endpoint,
            seed_service: None,
        }
    }

    /// Build a target from an IP literal.
    pub fn for_ip(raw: &str, flag: &str) -> RiptideResult<Self> {
        let ip: IpAddr = raw.parse().map_err(|_| RiptideError::InvalidArgument {
            flag: flag.to_string(),
            reason: format!("'{raw}' is not a valid IP address"),
        })?;
        Ok(Self::for_endpoint(NetworkEndpoint::for_ip(ip)))
    }

    pub fn for_hostname(hostname: &str) -> Self {
        Self::for_endpoint(NetworkEndpoint::for_hostname(hostname))
    }

    /// Build a target from an IP literal and a hostname naming the same host.
    pub fn for_ip_and_hostname(raw_ip: &str, hostname: &str, flag: &str) -> RiptideResult<Self> {
        let ip: IpAddr = raw_ip.parse().map_err(|_| RiptideError::InvalidArgument {
            flag: flag.to_string(),
            reason: format!("'{raw_ip}' is not a valid IP address"),
        })?;
        Ok(Self::for_endpoint(NetworkEndpoint::for_ip_and_hostname(
            ip, hostname,
        )))
    }

    /// Derive a target from a URI. The host is resolved to an address, the
    /// scheme determines the service name and default port, and the URI path
    /// becomes the web application root.
    pub async fn from_uri(raw: &str) -> RiptideResult<Self> {
        let url = Url::parse(raw).map_err(|e| RiptideError::InvalidArgument {
            flag: "--uri-target".to_string(),
            reason: format!("'{raw}' is not a valid URL: {e}"),
        })?;

        let service_name = match url.scheme() {
            "http" => "http",
            "https" => "https",
            other => {
                return Err(RiptideError::InvalidArgument {
                    flag: "--uri-target".to_string(),
                    reason: format!("unsupported scheme '{other}'"),
                })
            }
        };
        let host = url
            .host_str()
            .ok_or_else(|| RiptideError::InvalidArgument {
                flag: "--uri-target".to_string(),
                reason: "URL has no host".to_string(),
            })?
            .to_string();
        let port = url
            .port()
            .unwrap_or(if service_name == "https" { 443 } else { 80 });

        let ip = resolve_host(&host, port).await?;
        debug!("Resolved URI target host {} to {}", host, ip);

        let endpoint = NetworkEndpoint::for_ip_hostname_and_port(ip, host, port);
        let application_root = if url.path().is_empty() {
            "/".to_string()
        } else {
            url.path().to_string()
        };
        let seed_service = NetworkService::new(endpoint.clone(), Transport::Tcp)
            .with_service_name(service_name)
            .with_service_context(ServiceContext::web(application_root));

        Ok(Self {
            endpoint,
            seed_service: Some(seed_service),
        })
    }
}

async fn resolve_host(host: &str, port: u16) -> RiptideResult<IpAddr> {
    // IP literals short-circuit the resolver.
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }
    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| RiptideError::NetworkError(format!("failed to resolve '{host}': {e}")))?;
    addrs
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| RiptideError::NetworkError(format!("no addresses found for '{host}'")))
}
