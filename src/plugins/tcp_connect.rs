// src/plugins/tcp_connect.rs
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::core::{
    NetworkService, PortScanningReport, ScanTarget, TargetInfo, Transport,
};
use crate::error::{RiptideError, RiptideResult};
use crate::plugin::{PluginDescriptor, PluginType, PortScanner};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const PROBE_CONCURRENCY: usize = 64;

/// Plain TCP connect scanner over a configured port list. No raw sockets,
/// no privileges needed; a completed handshake marks the port open.
pub struct TcpConnectPortScanner {
    ports: Vec<u16>,
}

impl TcpConnectPortScanner {
    pub fn new(ports: Vec<u16>) -> Self {
        Self { ports }
    }

    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::PortScan,
            "TcpConnectPortScanner",
            "0.1.0",
            "TCP connect scan over the configured port list.",
            "Riptide Team",
        )
    }
}

#[async_trait]
impl PortScanner for TcpConnectPortScanner {
    async fn scan(&self, target: &ScanTarget) -> RiptideResult<PortScanningReport> {
        let ip = resolve_target_ip(target).await?;
        info!(
            "TCP connect scan of {} over {} ports",
            target.endpoint,
            self.ports.len()
        );

        let mut open_ports: Vec<u16> = stream::iter(self.ports.iter().copied())
            .map(|port| async move {
                let open = matches!(
                    tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((ip, port))).await,
                    Ok(Ok(_))
                );
                if open {
                    debug!("Port {} open on {}", port, ip);
                }
                (port, open)
            })
            .buffer_unordered(PROBE_CONCURRENCY)
            .filter_map(|(port, open)| async move { open.then_some(port) })
            .collect()
            .await;
        open_ports.sort_unstable();

        let services = open_ports
            .into_iter()
            .map(|port| {
                let mut service =
                    NetworkService::new(target.endpoint.with_port(port), Transport::Tcp);
                if let Some(name) = well_known_service(port) {
                    service = service.with_service_name(name);
                }
                service
            })
            .collect();

        Ok(PortScanningReport {
            target_info: TargetInfo::for_endpoint(target.endpoint.clone()),
            services,
        })
    }
}

async fn resolve_target_ip(target: &ScanTarget) -> RiptideResult<IpAddr> {
    if let Some(ip) = target.endpoint.ip() {
        return Ok(ip);
    }
    let host = target.endpoint.host();
    let mut addrs = tokio::net::lookup_host((host.as_str(), 0u16))
        .await
        .map_err(|e| RiptideError::NetworkError(format!("failed to resolve '{host}': {e}")))?;
    addrs
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| RiptideError::NetworkError(format!("no addresses found for '{host}'")))
}

/// Service name hint for well-known ports.
fn well_known_service(port: u16) -> Option<&'static str> {
    match port {
        21 => Some("ftp"),
        22 => Some("ssh"),
        23 => Some("telnet"),
        25 => Some("smtp"),
        53 => Some("domain"),
        80 => Some("http"),
        110 => Some("pop3"),
        143 => Some("imap"),
        443 => Some("https"),
        445 => Some("microsoft-ds"),
        587 => Some("submission"),
        993 => Some("imaps"),
        995 => Some("pop3s"),
        1433 => Some("ms-sql-s"),
        3306 => Some("mysql"),
        3389 => Some("ms-wbt-server"),
        5432 => Some("postgresql"),
        5900 => Some("vnc"),
        6379 => Some("redis"),
        8080 => Some("http-alt"),
        8443 => Some("https-alt"),
        9200 => Some("elasticsearch"),
        11211 => Some("memcache"),
        27017 => Some("mongod"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NetworkEndpoint;
    use tokio::net::TcpListener;

    #[test]
    fn well_known_ports_map_to_canonical_names() {
        assert_eq!(well_known_service(80), Some("http"));
        assert_eq!(well_known_service(8080), Some("http-alt"));
        assert_eq!(well_known_service(22), Some("ssh"));
        assert_eq!(well_known_service(31337), None);
    }

    #[tokio::test]
    async fn scan_reports_a_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let scanner = TcpConnectPortScanner::new(vec![port]);
        let target =
            ScanTarget::for_endpoint(NetworkEndpoint::for_ip("127.0.0.1".parse().unwrap()));

        let report = scanner.scan(&target).await.unwrap();

        assert_eq!(report.services.len(), 1);
        assert_eq!(report.services[0].endpoint.port(), Some(port));
        assert_eq!(report.services[0].transport, Transport::Tcp);
        drop(listener);
    }

    #[tokio::test]
    async fn scan_skips_closed_ports() {
        // Bind and immediately drop to get a port that is very likely closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let scanner = TcpConnectPortScanner::new(vec![port]);
        let target =
            ScanTarget::for_endpoint(NetworkEndpoint::for_ip("127.0.0.1".parse().unwrap()));

        let report = scanner.scan(&target).await.unwrap();

        assert!(report.services.is_empty());
    }
}
