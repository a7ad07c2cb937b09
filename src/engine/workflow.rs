// src/engine/workflow.rs
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::core::{
    FingerprintingReport, NetworkService, PortScanningReport, ReconnaissanceReport, ScanFinding,
    ScanResults, ScanStatus, ScanTarget, TargetInfo, WebServiceContext,
};
use crate::error::{RiptideError, RiptideResult};
use crate::plugin::{MatchedDetector, PluginManager};

use super::executor::{ExecutionEngine, ExecutionResult};

/// The four-phase scan pipeline: port scan, service fingerprinting,
/// web-service enrichment, vulnerability detection. Each phase fans out over
/// the shared execution engine and is fully observed before the next phase
/// submits anything.
pub struct ScanWorkflow {
    manager: PluginManager,
    engine: Arc<ExecutionEngine>,
    deadline: Option<Duration>,
    grace: Duration,
}

impl ScanWorkflow {
    pub fn new(manager: PluginManager, engine: Arc<ExecutionEngine>) -> Self {
        Self {
            manager,
            engine,
            deadline: None,
            grace: Duration::from_secs(30),
        }
    }

    /// Overall wall-clock limit for the scan. When it expires, results
    /// collected so far are finalized as partially succeeded.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// How long to keep accepting in-flight results after the deadline.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Run the full pipeline. Always produces a `ScanResults`; failures are
    /// reflected in its status and message, never raised.
    pub async fn run(&self, target: &ScanTarget) -> ScanResults {
        let started = Instant::now();
        info!("Starting scan of {}", target.endpoint);

        let port_scan_report = match self.port_scan(target, started).await {
            Ok(report) => report,
            Err(error) => {
                warn!("Scan failed: {}", error);
                return ScanResults::failed(
                    error.to_string(),
                    started.elapsed(),
                    ReconnaissanceReport {
                        target_info: TargetInfo::for_endpoint(target.endpoint.clone()),
                        services: Vec::new(),
                    },
                );
            }
        };
        info!(
            "Port scan phase discovered {} services",
            port_scan_report.services.len()
        );

        let recon_report = self.fingerprint(target, port_scan_report, started).await;
        let recon_report = enrich_web_services(recon_report);

        let (status, status_message, scan_findings) = self.detect(&recon_report, started).await;

        let duration = started.elapsed();
        info!("Scan finished with status {} in {:?}", status, duration);
        ScanResults {
            status,
            status_message,
            duration,
            reconnaissance_report: recon_report,
            scan_findings,
        }
    }

    /// Phase 1. Runs the first installed port scanner once. A target that
    /// already names its service (URI targets) seeds the report directly.
    async fn port_scan(
        &self,
        target: &ScanTarget,
        started: Instant,
    ) -> RiptideResult<PortScanningReport> {
        if let Some(seed) = &target.seed_service {
            debug!("Target carries a known service, skipping port scan");
            return Ok(PortScanningReport {
                target_info: TargetInfo::for_endpoint(target.endpoint.clone()),
                services: vec![seed.clone()],
            });
        }

        let scanner =
            self.manager
                .get_port_scanner()
                .ok_or_else(|| RiptideError::ScanWorkflowFailure {
                    phase: "port_scan".to_string(),
                    reason: "no port scanner installed".to_string(),
                })?;
        info!("Running port scanner '{}'", scanner.descriptor.name);

        let plugin = Arc::clone(&scanner.plugin);
        let scan_target = target.clone();
        let execution = self
            .engine
            .execute(&scanner.descriptor, async move {
                plugin.scan(&scan_target).await
            });

        let result = match self.remaining(started) {
            Some(remaining) => match tokio::time::timeout(remaining, execution).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(RiptideError::ScanWorkflowFailure {
                        phase: "port_scan".to_string(),
                        reason: "scan deadline exceeded".to_string(),
                    })
                }
            },
            None => execution.await,
        };

        match result.data {
            Some(report) => Ok(report),
            None => Err(RiptideError::ScanWorkflowFailure {
                phase: "port_scan".to_string(),
                reason: result
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "port scanner produced no report".to_string()),
            }),
        }
    }

    /// Phase 2. Fingerprints every discovered service that has a matching
    /// fingerprinter. Individual failures keep the original service.
    async fn fingerprint(
        &self,
        target: &ScanTarget,
        report: PortScanningReport,
        started: Instant,
    ) -> ReconnaissanceReport {
        if target.seed_service.is_some() {
            return ReconnaissanceReport {
                target_info: report.target_info,
                services: report.services,
            };
        }

        let mut jobs = Vec::new();
        for (idx, service) in report.services.iter().enumerate() {
            match self.manager.get_service_fingerprinter(service) {
                Some(matched) => jobs.push((idx, matched)),
                None => debug!("No fingerprinter for service {}", service.endpoint),
            }
        }

        let total = jobs.len();
        let (tx, rx) = mpsc::channel(total.max(1));
        for (idx, matched) in jobs {
            let engine = Arc::clone(&self.engine);
            let descriptor = matched.descriptor.clone();
            let plugin = Arc::clone(&matched.plugin);
            let target_info = report.target_info.clone();
            let service = report.services[idx].clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = engine
                    .execute(&descriptor, async move {
                        plugin.fingerprint(&target_info, &service).await
                    })
                    .await;
                let _ = tx.send((idx, result)).await;
            });
        }
        drop(tx);

        let fingerprints = self.collect(rx, total, started).await;

        let mut services = report.services;
        for (_, result) in fingerprints {
            match result.data {
                Some(fingerprint) => merge_fingerprint(&mut services, fingerprint),
                None => warn!(
                    "Fingerprinter '{}' failed, keeping unfingerprinted service",
                    result.descriptor.name
                ),
            }
        }

        ReconnaissanceReport {
            target_info: report.target_info,
            services,
        }
    }

    /// Phase 4. Fans out every matched detector and folds the outcomes into
    /// the final status.
    async fn detect(
        &self,
        recon_report: &ReconnaissanceReport,
        started: Instant,
    ) -> (ScanStatus, String, Vec<ScanFinding>) {
        let detectors = self.manager.get_vuln_detectors(recon_report);
        let total = detectors.len();
        if total == 0 {
            info!("No vuln detectors matched the target");
            return (ScanStatus::Succeeded, String::new(), Vec::new());
        }
        info!("Running {} vuln detectors", total);

        let (tx, rx) = mpsc::channel(total);
        for (idx, matched) in detectors.into_iter().enumerate() {
            let engine = Arc::clone(&self.engine);
            let target_info = recon_report.target_info.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = match matched {
                    MatchedDetector::Local(local) => {
                        let plugin = Arc::clone(&local.plugin);
                        let services = local.matched_services.clone();
                        engine
                            .execute(&local.descriptor, async move {
                                plugin.detect(&target_info, &services).await
                            })
                            .await
                    }
                    MatchedDetector::Remote {
                        descriptor,
                        plugin,
                        sub_matches,
                        ..
                    } => {
                        engine
                            .execute(&descriptor, async move {
                                plugin.detect(&target_info, &sub_matches).await
                            })
                            .await
                    }
                };
                let _ = tx.send((idx, result)).await;
            });
        }
        drop(tx);

        let results = self.collect(rx, total, started).await;
        let resolved = results.len();
        let failed = results.iter().filter(|(_, r)| !r.is_succeeded()).count();

        let scan_findings: Vec<ScanFinding> = results
            .into_iter()
            .filter_map(|(_, result)| result.data)
            .flatten()
            .map(ScanFinding::from)
            .collect();

        if resolved == total && failed == total {
            (
                ScanStatus::Failed,
                "All VulnDetectors failed.".to_string(),
                scan_findings,
            )
        } else if resolved < total {
            (
                ScanStatus::PartiallySucceeded,
                format!(
                    "Scan deadline exceeded; {} of {} VulnDetectors completed.",
                    resolved, total
                ),
                scan_findings,
            )
        } else if failed > 0 {
            (
                ScanStatus::PartiallySucceeded,
                format!("{} of {} VulnDetectors failed.", failed, total),
                scan_findings,
            )
        } else {
            (ScanStatus::Succeeded, String::new(), scan_findings)
        }
    }

    /// Drain a phase's result channel, honoring the scan deadline. On
    /// expiry, in-flight plugins get the configured grace period to deliver
    /// before the phase is finalized with what resolved. Results come back
    /// stable-ordered by submission index.
    async fn collect<T>(
        &self,
        mut rx: mpsc::Receiver<(usize, ExecutionResult<T>)>,
        total: usize,
        started: Instant,
    ) -> Vec<(usize, ExecutionResult<T>)> {
        let mut results = Vec::with_capacity(total);
        while results.len() < total {
            let received = match self.remaining(started) {
                Some(remaining) => match tokio::time::timeout(remaining, rx.recv()).await {
                    Ok(received) => received,
                    Err(_) => {
                        warn!(
                            "Scan deadline reached with {} of {} results; draining for {:?}",
                            results.len(),
                            total,
                            self.grace
                        );
                        let drain_until = Instant::now() + self.grace;
                        while results.len() < total {
                            let now = Instant::now();
                            if now >= drain_until {
                                break;
                            }
                            match tokio::time::timeout(drain_until - now, rx.recv()).await {
                                Ok(Some(item)) => results.push(item),
                                _ => break,
                            }
                        }
                        break;
                    }
                },
                None => rx.recv().await,
            };
            match received {
                Some(item) => results.push(item),
                None => break,
            }
        }
        results.sort_by_key(|(idx, _)| *idx);
        results
    }

    fn remaining(&self, started: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_sub(started.elapsed()))
    }
}

/// Replace services with their fingerprinted version, keyed by where they
/// listen. Services the fingerprinter did not report survive unchanged.
fn merge_fingerprint(services: &mut [NetworkService], fingerprint: FingerprintingReport) {
    for enriched in fingerprint.services {
        if let Some(existing) = services
            .iter_mut()
            .find(|service| service.key() == enriched.key())
        {
            *existing = enriched;
        }
    }
}

/// Phase 3. Any web service without an application root gets the default
/// root.
fn enrich_web_services(mut report: ReconnaissanceReport) -> ReconnaissanceReport {
    for service in &mut report.services {
        if service.is_web_service() && service.application_root().is_none() {
            let context = service.service_context.get_or_insert_with(Default::default);
            context.web_service_context = Some(WebServiceContext {
                application_root: "/".to_string(),
            });
        }
    }
    report
}
