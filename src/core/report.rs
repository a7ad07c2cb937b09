// src/core/report.rs
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::network::{NetworkService, TargetInfo};

/// Severity of a reported vulnerability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Info => "INFO",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publisher-scoped identifier of a vulnerability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityId {
    pub publisher: String,
    pub value: String,
}

impl VulnerabilityId {
    pub fn new(publisher: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            publisher: publisher.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub main_id: VulnerabilityId,
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

/// Output of the port scanning phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortScanningReport {
    pub target_info: TargetInfo,
    pub services: Vec<NetworkService>,
}

/// Output of one fingerprinter run. The listed services replace the scanned
/// service they share an endpoint and transport with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintingReport {
    pub services: Vec<NetworkService>,
}

/// Everything learned about the target before vulnerability detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnaissanceReport {
    pub target_info: TargetInfo,
    pub services: Vec<NetworkService>,
}

/// A single vulnerability reported by a detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub target_info: TargetInfo,
    pub service: NetworkService,
    pub vulnerability: Vulnerability,
    pub detected_at: DateTime<Utc>,
}

/// One entry in the final scan report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFinding {
    pub target_info: TargetInfo,
    pub service: NetworkService,
    pub vulnerability: Vulnerability,
}

impl From<DetectionReport> for ScanFinding {
    fn from(report: DetectionReport) -> Self {
        Self {
            target_info: report.target_info,
            service: report.service,
            vulnerability: report.vulnerability,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    Succeeded,
    PartiallySucceeded,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "SUCCEEDED",
            Self::PartiallySucceeded => "PARTIALLY_SUCCEEDED",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The final result of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResults {
    pub status: ScanStatus,
    /// Human description of why the scan is not SUCCEEDED; empty otherwise.
    pub status_message: String,
    pub duration: Duration,
    pub reconnaissance_report: ReconnaissanceReport,
    pub scan_findings: Vec<ScanFinding>,
}

impl ScanResults {
    pub fn failed(
        message: impl Into<String>,
        duration: Duration,
        reconnaissance_report: ReconnaissanceReport,
    ) -> Self {
        Self {
            status: ScanStatus::Failed,
            status_message: message.into(),
            duration,
            reconnaissance_report,
            scan_findings: Vec::new(),
        }
    }
}
