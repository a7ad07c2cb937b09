// src/plugin/testing.rs
//
// Fake plugins and report fixtures shared by the module tests.

use async_trait::async_trait;
use chrono::Utc;

use crate::core::{
    DetectionReport, FingerprintingReport, NetworkEndpoint, NetworkService, OperatingSystemClass,
    PortScanningReport, ReconnaissanceReport, ScanTarget, ServiceContext, Severity, Software,
    TargetInfo, Transport, Vulnerability, VulnerabilityId,
};
use crate::error::{RiptideError, RiptideResult};

use super::{
    MatchedPlugin, OsClassSelector, PluginDescriptor, PluginType, PortScanner, RemoteVulnDetector,
    Selectors, ServiceFingerprinter, VulnDetector,
};

pub fn endpoint(port: u16) -> NetworkEndpoint {
    NetworkEndpoint::for_ip_and_port("1.1.1.1".parse().unwrap(), port)
}

pub fn http_service(port: u16) -> NetworkService {
    NetworkService::new(endpoint(port), Transport::Tcp).with_service_name("http")
}

pub fn https_service(port: u16) -> NetworkService {
    NetworkService::new(endpoint(port), Transport::Tcp).with_service_name("https")
}

pub fn no_name_service(port: u16) -> NetworkService {
    NetworkService::new(endpoint(port), Transport::Tcp)
}

pub fn wordpress_service() -> NetworkService {
    http_service(80).with_software(Software::named("WordPress"))
}

pub fn jenkins_service() -> NetworkService {
    https_service(443).with_software(Software::named("Jenkins"))
}

pub fn fake_os_target_info(accuracy: u32) -> TargetInfo {
    TargetInfo::default().with_os_class(OperatingSystemClass {
        os_type: Some("general purpose".to_string()),
        vendor: "Vendor".to_string(),
        os_family: "FakeOS".to_string(),
        accuracy,
    })
}

pub fn recon_report(target_info: TargetInfo, services: Vec<NetworkService>) -> ReconnaissanceReport {
    ReconnaissanceReport {
        target_info,
        services,
    }
}

pub struct FakePortScanner;

impl FakePortScanner {
    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::PortScan,
            "FakePortScanner",
            "v0.1",
            "A fake PortScanner.",
            "fake",
        )
    }

    /// The single service this scanner always "discovers" on a target.
    pub fn fake_network_service(endpoint: &NetworkEndpoint) -> NetworkService {
        NetworkService::new(endpoint.with_port(80), Transport::Tcp).with_service_name("http")
    }
}

#[async_trait]
impl PortScanner for FakePortScanner {
    async fn scan(&self, target: &ScanTarget) -> RiptideResult<PortScanningReport> {
        Ok(PortScanningReport {
            target_info: TargetInfo::for_endpoint(target.endpoint.clone()),
            services: vec![Self::fake_network_service(&target.endpoint)],
        })
    }
}

pub struct FakePortScanner2;

impl FakePortScanner2 {
    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::PortScan,
            "FakePortScanner2",
            "v0.1",
            "Another fake PortScanner.",
            "fake",
        )
    }
}

#[async_trait]
impl PortScanner for FakePortScanner2 {
    async fn scan(&self, target: &ScanTarget) -> RiptideResult<PortScanningReport> {
        Ok(PortScanningReport {
            target_info: TargetInfo::for_endpoint(target.endpoint.clone()),
            services: vec![FakePortScanner::fake_network_service(&target.endpoint)],
        })
    }
}

pub struct FailingPortScanner;

impl FailingPortScanner {
    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::PortScan,
            "FailingPortScanner",
            "v0.1",
            "A PortScanner that always fails.",
            "fake",
        )
    }
}

#[async_trait]
impl PortScanner for FailingPortScanner {
    async fn scan(&self, _target: &ScanTarget) -> RiptideResult<PortScanningReport> {
        Err(RiptideError::NetworkError("port scan failed".to_string()))
    }
}

/// Fingerprinter that marks every matched service as a web application at
/// the default root.
pub struct FakeServiceFingerprinter;

impl FakeServiceFingerprinter {
    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::ServiceFingerprint,
            "FakeServiceFingerprinter",
            "v0.1",
            "A fake ServiceFingerprinter.",
            "fake",
        )
        .with_selectors(Selectors::for_service_names(["http"]))
    }

    pub fn add_web_service_context(service: NetworkService) -> NetworkService {
        service.with_service_context(ServiceContext::web("/"))
    }
}

#[async_trait]
impl ServiceFingerprinter for FakeServiceFingerprinter {
    async fn fingerprint(
        &self,
        _target_info: &TargetInfo,
        service: &NetworkService,
    ) -> RiptideResult<FingerprintingReport> {
        Ok(FingerprintingReport {
            services: vec![Self::add_web_service_context(service.clone())],
        })
    }
}

pub struct FailingServiceFingerprinter;

impl FailingServiceFingerprinter {
    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::ServiceFingerprint,
            "FailingServiceFingerprinter",
            "v0.1",
            "A ServiceFingerprinter that always fails.",
            "fake",
        )
        .with_selectors(Selectors::for_service_names(["http"]))
    }
}

#[async_trait]
impl ServiceFingerprinter for FailingServiceFingerprinter {
    async fn fingerprint(
        &self,
        _target_info: &TargetInfo,
        _service: &NetworkService,
    ) -> RiptideResult<FingerprintingReport> {
        Err(RiptideError::NetworkError("banner grab failed".to_string()))
    }
}

pub struct FakeVulnDetector;

impl FakeVulnDetector {
    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::VulnDetection,
            "FakeVulnDetector",
            "v0.1",
            "A fake VulnDetector.",
            "fake",
        )
    }

    pub fn fake_advisory() -> Vulnerability {
        Vulnerability {
            main_id: VulnerabilityId::new("GOOGLE", "FakeVuln1"),
            severity: Severity::Critical,
            title: "FakeTitle1".to_string(),
            description: "FakeDescription1".to_string(),
        }
    }

    pub fn fake_detection_report(
        target_info: &TargetInfo,
        service: &NetworkService,
    ) -> DetectionReport {
        DetectionReport {
            target_info: target_info.clone(),
            service: service.clone(),
            vulnerability: Self::fake_advisory(),
            detected_at: Utc::now(),
        }
    }
}

#[async_trait]
impl VulnDetector for FakeVulnDetector {
    async fn detect(
        &self,
        target_info: &TargetInfo,
        matched_services: &[NetworkService],
    ) -> RiptideResult<Vec<DetectionReport>> {
        Ok(matched_services
            .iter()
            .map(|service| Self::fake_detection_report(target_info, service))
            .collect())
    }

    fn advisories(&self) -> Vec<Vulnerability> {
        vec![Self::fake_advisory()]
    }
}

pub struct FakeVulnDetector2;

impl FakeVulnDetector2 {
    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::VulnDetection,
            "FakeVulnDetector2",
            "v0.1",
            "Another fake VulnDetector.",
            "fake",
        )
    }

    pub fn fake_advisory() -> Vulnerability {
        Vulnerability {
            main_id: VulnerabilityId::new("GOOGLE", "FakeVuln2"),
            severity: Severity::Medium,
            title: "FakeTitle2".to_string(),
            description: "FakeDescription2".to_string(),
        }
    }

    pub fn fake_detection_report(
        target_info: &TargetInfo,
        service: &NetworkService,
    ) -> DetectionReport {
        DetectionReport {
            target_info: target_info.clone(),
            service: service.clone(),
            vulnerability: Self::fake_advisory(),
            detected_at: Utc::now(),
        }
    }
}

#[async_trait]
impl VulnDetector for FakeVulnDetector2 {
    async fn detect(
        &self,
        target_info: &TargetInfo,
        matched_services: &[NetworkService],
    ) -> RiptideResult<Vec<DetectionReport>> {
        Ok(matched_services
            .iter()
            .map(|service| Self::fake_detection_report(target_info, service))
            .collect())
    }

    fn advisories(&self) -> Vec<Vulnerability> {
        vec![Self::fake_advisory()]
    }
}

pub struct FailedVulnDetector;

impl FailedVulnDetector {
    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::VulnDetection,
            "FailedVulnDetector",
            "v0.1",
            "A VulnDetector that always fails.",
            "fake",
        )
    }
}

#[async_trait]
impl VulnDetector for FailedVulnDetector {
    async fn detect(
        &self,
        _target_info: &TargetInfo,
        _matched_services: &[NetworkService],
    ) -> RiptideResult<Vec<DetectionReport>> {
        Err(RiptideError::Unexpected("detector exploded".to_string()))
    }

    fn advisories(&self) -> Vec<Vulnerability> {
        Vec::new()
    }
}

/// Remote detector fronting four logical definitions with different
/// selectors, mirroring the sub-definition matching contract.
pub struct FakeFilteringRemoteDetector;

impl FakeFilteringRemoteDetector {
    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::RemoteVulnDetection,
            "FakeFilteringRemoteDetector",
            "v0.1",
            "A fake RemoteVulnDetector.",
            "fake",
        )
    }

    pub fn http_sub_definition() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::VulnDetection,
            "FakeHttpServiceVuln",
            "v0.1",
            "A fake VulnDetector.",
            "fake",
        )
        .with_selectors(Selectors::for_service_names(["http"]))
    }

    pub fn jenkins_sub_definition() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::VulnDetection,
            "FakeJenkinsVuln",
            "v0.1",
            "A fake VulnDetector.",
            "fake",
        )
        .with_selectors(Selectors::for_software("Jenkins"))
    }

    pub fn os_sub_definition() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::VulnDetection,
            "FakeOsVuln",
            "v0.1",
            "A fake VulnDetector that targets services running on FakeOS.",
            "fake",
        )
        .with_selectors(Selectors::default().with_os_class(OsClassSelector {
            families: vec!["ThisWontMatch".to_string(), "FakeOS".to_string()],
            ..OsClassSelector::default()
        }))
    }

    pub fn os_and_http_sub_definition() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::VulnDetection,
            "FakeOsHttpVuln",
            "v0.1",
            "A fake VulnDetector that targets http services running on FakeOS.",
            "fake",
        )
        .with_selectors(
            Selectors::for_service_names(["http"]).with_os_class(OsClassSelector {
                families: vec!["FakeOS".to_string()],
                min_accuracy: 90,
                ..OsClassSelector::default()
            }),
        )
    }
}

#[async_trait]
impl RemoteVulnDetector for FakeFilteringRemoteDetector {
    fn sub_plugins(&self) -> Vec<PluginDescriptor> {
        vec![
            Self::http_sub_definition(),
            Self::jenkins_sub_definition(),
            Self::os_sub_definition(),
            Self::os_and_http_sub_definition(),
        ]
    }

    async fn detect(
        &self,
        target_info: &TargetInfo,
        matched_plugins: &[MatchedPlugin],
    ) -> RiptideResult<Vec<DetectionReport>> {
        Ok(matched_plugins
            .iter()
            .flat_map(|matched| matched.services.iter())
            .map(|service| FakeVulnDetector::fake_detection_report(target_info, service))
            .collect())
    }

    fn advisories(&self) -> Vec<Vulnerability> {
        Vec::new()
    }
}
