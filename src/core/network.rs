// src/core/network.rs
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Service names that carry HTTP or HTTPS traffic. A service whose name is in
/// this set is treated as a web service by selector matching and by the
/// web-service enrichment phase.
pub const WEB_SERVICE_NAMES: [&str; 7] = [
    "http",
    "https",
    "http-proxy",
    "http-alt",
    "https-alt",
    "ssl/http",
    "ssl/https",
];

/// Returns true if the service name denotes HTTP or HTTPS traffic.
pub fn is_web_service_name(name: &str) -> bool {
    WEB_SERVICE_NAMES
        .iter()
        .any(|web| web.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => Self::Ipv4,
            IpAddr::V6(_) => Self::Ipv6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transport {
    Tcp,
    Udp,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

/// A network address in one of the shapes a scan target can take: an IP, a
/// hostname, or both, each optionally qualified with a port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkEndpoint {
    Ip { ip: IpAddr },
    Hostname { hostname: String },
    IpHostname { ip: IpAddr, hostname: String },
    IpPort { ip: IpAddr, port: u16 },
    HostnamePort { hostname: String, port: u16 },
    IpHostnamePort { ip: IpAddr, hostname: String, port: u16 },
}

impl NetworkEndpoint {
    pub fn for_ip(ip: IpAddr) -> Self {
        Self::Ip { ip }
    }

    pub fn for_hostname(hostname: impl Into<String>) -> Self {
        Self::Hostname {
            hostname: hostname.into(),
        }
    }

    pub fn for_ip_and_hostname(ip: IpAddr, hostname: impl Into<String>) -> Self {
        Self::IpHostname {
            ip,
            hostname: hostname.into(),
        }
    }

    pub fn for_ip_and_port(ip: IpAddr, port: u16) -> Self {
        Self::IpPort { ip, port }
    }

    pub fn for_hostname_and_port(hostname: impl Into<String>, port: u16) -> Self {
        Self::HostnamePort {
            hostname: hostname.into(),
            port,
        }
    }

    pub fn for_ip_hostname_and_port(ip: IpAddr, hostname: impl Into<String>, port: u16) -> Self {
        Self::IpHostnamePort {
            ip,
            hostname: hostname.into(),
            port,
        }
    }

    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Self::Ip { ip }
            | Self::IpHostname { ip, .. }
            | Self::IpPort { ip, .. }
            | Self::IpHostnamePort { ip, .. } => Some(*ip),
            _ => None,
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        match self {
            Self::Hostname { hostname }
            | Self::IpHostname { hostname, .. }
            | Self::HostnamePort { hostname, .. }
            | Self::IpHostnamePort { hostname, .. } => Some(hostname),
            _ => None,
        }
    }

    pub fn port(&self) -> Option<u16> {
        match self {
            Self::IpPort { port, .. }
            | Self::HostnamePort { port, .. }
            | Self::IpHostnamePort { port, .. } => Some(*port),
            _ => None,
        }
    }

    pub fn address_family(&self) -> Option<AddressFamily> {
        self.ip().map(|ip| AddressFamily::of(&ip))
    }

    /// The same address qualified with a port number.
    pub fn with_port(&self, port: u16) -> Self {
        match self.clone() {
            Self::Ip { ip } | Self::IpPort { ip, .. } => Self::IpPort { ip, port },
            Self::Hostname { hostname } | Self::HostnamePort { hostname, .. } => {
                Self::HostnamePort { hostname, port }
            }
            Self::IpHostname { ip, hostname } | Self::IpHostnamePort { ip, hostname, .. } => {
                Self::IpHostnamePort { ip, hostname, port }
            }
        }
    }

    /// Best host string for dialing: hostname when present, IP otherwise.
    pub fn host(&self) -> String {
        match self.hostname() {
            Some(hostname) => hostname.to_string(),
            None => self
                .ip()
                .map(|ip| ip.to_string())
                .unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for NetworkEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.port() {
            Some(port) => write!(f, "{}:{}", self.host(), port),
            None => write!(f, "{}", self.host()),
        }
    }
}

/// Identified software running behind a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Software {
    pub name: String,
    pub version: Option<String>,
}

impl Software {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebServiceContext {
    pub application_root: String,
}

/// Protocol-specific context. Currently only web services carry extra
/// context, but the wrapper leaves room for other protocols.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceContext {
    pub web_service_context: Option<WebServiceContext>,
}

impl ServiceContext {
    pub fn web(application_root: impl Into<String>) -> Self {
        Self {
            web_service_context: Some(WebServiceContext {
                application_root: application_root.into(),
            }),
        }
    }
}

/// A single exposed network service on a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkService {
    pub endpoint: NetworkEndpoint,
    pub transport: Transport,
    /// Canonical lowercase service name, e.g. "http", "ssh". Absent when the
    /// port scanner could not identify the protocol.
    pub service_name: Option<String>,
    pub software: Option<Software>,
    pub service_context: Option<ServiceContext>,
}

impl NetworkService {
    pub fn new(endpoint: NetworkEndpoint, transport: Transport) -> Self {
        Self {
            endpoint,
            transport,
            service_name: None,
            software: None,
            service_context: None,
        }
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into().to_lowercase());
        self
    }

    pub fn with_software(mut self, software: Software) -> Self {
        self.software = Some(software);
        self
    }

    pub fn with_service_context(mut self, context: ServiceContext) -> Self {
        self.service_context = Some(context);
        self
    }

    pub fn is_web_service(&self) -> bool {
        self.service_name
            .as_deref()
            .map(is_web_service_name)
            .unwrap_or(false)
    }

    pub fn application_root(&self) -> Option<&str> {
        self.service_context
            .as_ref()
            .and_then(|ctx| ctx.web_service_context.as_ref())
            .map(|web| web.application_root.as_str())
    }

    /// Identity of a service inside one scan: where it listens.
    pub fn key(&self) -> (NetworkEndpoint, Transport) {
        (self.endpoint.clone(), self.transport)
    }
}

/// An operating-system guess for a target, ordered by the scanner's
/// confidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingSystemClass {
    pub os_type: Option<String>,
    pub vendor: String,
    pub os_family: String,
    /// Confidence in this guess, 0-100.
    pub accuracy: u32,
}

/// Everything known about one scanned host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub endpoints: Vec<NetworkEndpoint>,
    pub operating_system_classes: Vec<OperatingSystemClass>,
}

impl TargetInfo {
    pub fn for_endpoint(endpoint: NetworkEndpoint) -> Self {
        Self {
            endpoints: vec![endpoint],
            operating_system_classes: Vec::new(),
        }
    }

    pub fn with_os_class(mut self, os_class: OperatingSystemClass) -> Self {
        self.operating_system_classes.push(os_class);
        self
    }
}
