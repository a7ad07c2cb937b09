// src/core/mod.rs
pub mod network;
pub mod report;
pub mod target;

pub use network::{
    is_web_service_name, AddressFamily, NetworkEndpoint, NetworkService, OperatingSystemClass,
    ServiceContext, Software, TargetInfo, Transport, WebServiceContext,
};
pub use report::{
    DetectionReport, FingerprintingReport, PortScanningReport, ReconnaissanceReport, ScanFinding,
    ScanResults, ScanStatus, Severity, Vulnerability, VulnerabilityId,
};
pub use target::ScanTarget;
