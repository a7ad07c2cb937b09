// src/plugin/mod.rs
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{
    DetectionReport, FingerprintingReport, NetworkService, PortScanningReport, ScanTarget,
    TargetInfo, Vulnerability,
};
use crate::error::RiptideResult;

pub mod manager;
pub mod matcher;
pub mod registry;
#[cfg(test)]
pub mod testing;

pub use manager::PluginManager;
pub use registry::{PluginRegistry, RegistryBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginType {
    PortScan,
    ServiceFingerprint,
    VulnDetection,
    RemoteVulnDetection,
}

impl PluginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PortScan => "port_scan",
            Self::ServiceFingerprint => "service_fingerprint",
            Self::VulnDetection => "vuln_detection",
            Self::RemoteVulnDetection => "remote_vuln_detection",
        }
    }
}

/// Restriction on the operating system a detector applies to. A target
/// matches when any of its OS guesses satisfies every non-empty constraint
/// at the required accuracy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsClassSelector {
    pub vendors: Vec<String>,
    pub families: Vec<String>,
    pub min_accuracy: u32,
}

/// Declarative restriction of which services a plugin applies to. Absent
/// fields match everything; information missing on the service side is
/// permissive so that detectors still run against poorly-identified
/// services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    pub service_names: Vec<String>,
    pub software_name: Option<String>,
    pub os_class: Option<OsClassSelector>,
    pub for_web_service: bool,
}

impl Selectors {
    pub fn for_service_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            service_names: names.into_iter().map(|n| n.into().to_lowercase()).collect(),
            ..Self::default()
        }
    }

    pub fn for_software(name: impl Into<String>) -> Self {
        Self {
            software_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn for_web_service() -> Self {
        Self {
            for_web_service: true,
            ..Self::default()
        }
    }

    pub fn with_os_class(mut self, os_class: OsClassSelector) -> Self {
        self.os_class = Some(os_class);
        self
    }

    /// True when no selector is declared at all.
    pub fn is_empty(&self) -> bool {
        self.service_names.is_empty()
            && self.software_name.is_none()
            && self.os_class.is_none()
            && !self.for_web_service
    }

    /// True when the selectors restrict individual services (as opposed to
    /// only the target's operating system).
    pub fn has_service_constraint(&self) -> bool {
        !self.service_names.is_empty() || self.software_name.is_some() || self.for_web_service
    }
}

/// Immutable identity and matching metadata of one plugin, attached to the
/// plugin instance at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub plugin_type: PluginType,
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub selectors: Selectors,
}

impl PluginDescriptor {
    pub fn new(
        plugin_type: PluginType,
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            plugin_type,
            name: name.into(),
            version: version.into(),
            description: description.into(),
            author: author.into(),
            selectors: Selectors::default(),
        }
    }

    pub fn with_selectors(mut self, selectors: Selectors) -> Self {
        self.selectors = selectors;
        self
    }
}

/// Discovers open ports and raw services on a target.
#[async_trait]
pub trait PortScanner: Send + Sync {
    async fn scan(&self, target: &ScanTarget) -> RiptideResult<PortScanningReport>;
}

/// Enriches a discovered service with software and context information.
#[async_trait]
pub trait ServiceFingerprinter: Send + Sync {
    async fn fingerprint(
        &self,
        target_info: &TargetInfo,
        service: &NetworkService,
    ) -> RiptideResult<FingerprintingReport>;
}

/// Detects vulnerabilities on the services matched for it.
#[async_trait]
pub trait VulnDetector: Send + Sync {
    async fn detect(
        &self,
        target_info: &TargetInfo,
        matched_services: &[NetworkService],
    ) -> RiptideResult<Vec<DetectionReport>>;

    /// The advisories this detector can report, for `--dump-advisories`.
    fn advisories(&self) -> Vec<Vulnerability>;
}

/// One runtime plugin fronting many logical detector definitions, e.g. a
/// proxy to detectors hosted in an external language runtime. Matching runs
/// per sub-definition; the populated matches are handed over once at detect
/// time.
#[async_trait]
pub trait RemoteVulnDetector: Send + Sync {
    /// The logical detector definitions this instance fronts.
    fn sub_plugins(&self) -> Vec<PluginDescriptor>;

    async fn detect(
        &self,
        target_info: &TargetInfo,
        matched_plugins: &[MatchedPlugin],
    ) -> RiptideResult<Vec<DetectionReport>>;

    fn advisories(&self) -> Vec<Vulnerability>;
}

/// The registry's tagged union over plugin kinds.
#[derive(Clone)]
pub enum PluginKind {
    PortScanner(Arc<dyn PortScanner>),
    ServiceFingerprinter(Arc<dyn ServiceFingerprinter>),
    VulnDetector(Arc<dyn VulnDetector>),
    RemoteVulnDetector(Arc<dyn RemoteVulnDetector>),
}

impl PluginKind {
    pub fn plugin_type(&self) -> PluginType {
        match self {
            Self::PortScanner(_) => PluginType::PortScan,
            Self::ServiceFingerprinter(_) => PluginType::ServiceFingerprint,
            Self::VulnDetector(_) => PluginType::VulnDetection,
            Self::RemoteVulnDetector(_) => PluginType::RemoteVulnDetection,
        }
    }
}

impl std::fmt::Debug for PluginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.plugin_type().as_str())
    }
}

/// A plugin selected for execution together with the services it matched.
pub struct PluginMatchingResult<P: ?Sized> {
    pub descriptor: PluginDescriptor,
    pub plugin: Arc<P>,
    pub matched_services: Vec<NetworkService>,
}

impl<P: ?Sized> Clone for PluginMatchingResult<P> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            plugin: Arc::clone(&self.plugin),
            matched_services: self.matched_services.clone(),
        }
    }
}

/// One remote sub-definition and the services independently matched for it.
/// The list may be empty; the remote runtime decides what to do with
/// unmatched definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPlugin {
    pub descriptor: PluginDescriptor,
    pub services: Vec<NetworkService>,
}

/// Outcome of detector matching for one registry entry.
pub enum MatchedDetector {
    Local(PluginMatchingResult<dyn VulnDetector>),
    Remote {
        descriptor: PluginDescriptor,
        plugin: Arc<dyn RemoteVulnDetector>,
        matched_services: Vec<NetworkService>,
        sub_matches: Vec<MatchedPlugin>,
    },
}

impl MatchedDetector {
    pub fn descriptor(&self) -> &PluginDescriptor {
        match self {
            Self::Local(result) => &result.descriptor,
            Self::Remote { descriptor, .. } => descriptor,
        }
    }

    pub fn matched_services(&self) -> &[NetworkService] {
        match self {
            Self::Local(result) => &result.matched_services,
            Self::Remote {
                matched_services, ..
            } => matched_services,
        }
    }
}
