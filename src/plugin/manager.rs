// src/plugin/manager.rs
use std::sync::Arc;

use tracing::debug;

use crate::core::{NetworkService, ReconnaissanceReport};

use super::registry::DetectorRef;
use super::{
    matcher, MatchedDetector, MatchedPlugin, PluginMatchingResult, PluginRegistry, PortScanner,
    ServiceFingerprinter,
};

/// Query facade over the plugin registry: which plugins apply to a target,
/// and which services each of them should receive. All results preserve
/// registration order.
pub struct PluginManager {
    registry: Arc<PluginRegistry>,
    detectors_include: Option<Vec<String>>,
    detectors_exclude: Option<Vec<String>>,
}

impl PluginManager {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            registry,
            detectors_include: None,
            detectors_exclude: None,
        }
    }

    /// Restrict detector matching to the configured include/exclude name
    /// lists. Names are exact descriptor names; unknown names filter
    /// silently.
    pub fn with_detector_filters(
        mut self,
        include: Option<Vec<String>>,
        exclude: Option<Vec<String>>,
    ) -> Self {
        self.detectors_include = include;
        self.detectors_exclude = exclude;
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Every installed port scanner. Port scanners run before any service is
    /// known, so the matched service list is always empty.
    pub fn get_port_scanners(&self) -> Vec<PluginMatchingResult<dyn PortScanner>> {
        self.registry
            .port_scanners()
            .map(|(descriptor, plugin)| PluginMatchingResult {
                descriptor: descriptor.clone(),
                plugin: Arc::clone(plugin),
                matched_services: Vec::new(),
            })
            .collect()
    }

    /// The first installed port scanner, if any.
    pub fn get_port_scanner(&self) -> Option<PluginMatchingResult<dyn PortScanner>> {
        self.get_port_scanners().into_iter().next()
    }

    /// The first fingerprinter whose selectors match the service. A
    /// fingerprinter that declares no selectors at all is skipped:
    /// fingerprinting requires declared intent.
    pub fn get_service_fingerprinter(
        &self,
        service: &NetworkService,
    ) -> Option<PluginMatchingResult<dyn ServiceFingerprinter>> {
        self.registry
            .service_fingerprinters()
            .find(|(descriptor, _)| {
                !descriptor.selectors.is_empty()
                    && matcher::matches_service(&descriptor.selectors, service)
            })
            .map(|(descriptor, plugin)| PluginMatchingResult {
                descriptor: descriptor.clone(),
                plugin: Arc::clone(plugin),
                matched_services: vec![service.clone()],
            })
    }

    /// The detectors that apply to the reconnaissance report, each paired
    /// with the services it matched. Local detectors are included only when
    /// they matched at least one service; remote detectors are always
    /// included, with per-sub-definition matches that may be empty.
    pub fn get_vuln_detectors(&self, report: &ReconnaissanceReport) -> Vec<MatchedDetector> {
        let mut matched_detectors = Vec::new();

        for (descriptor, detector) in self.registry.detectors() {
            if !self.detector_allowed(&descriptor.name) {
                debug!("Detector '{}' removed by name filter", descriptor.name);
                continue;
            }
            match detector {
                DetectorRef::Local(plugin) => {
                    if !matcher::matches_os(&descriptor.selectors, &report.target_info) {
                        debug!(
                            "Detector '{}' excluded: OS selector does not match target",
                            descriptor.name
                        );
                        continue;
                    }
                    let matched = matcher::filter_services(
                        &descriptor.selectors,
                        &report.services,
                        &report.target_info,
                    );
                    if matched.is_empty() {
                        debug!("Detector '{}' matched no services", descriptor.name);
                        continue;
                    }
                    matched_detectors.push(MatchedDetector::Local(PluginMatchingResult {
                        descriptor: descriptor.clone(),
                        plugin: Arc::clone(plugin),
                        matched_services: matched,
                    }));
                }
                DetectorRef::Remote(plugin) => {
                    let sub_matches = plugin
                        .sub_plugins()
                        .into_iter()
                        .map(|sub| {
                            let services = matcher::filter_services(
                                &sub.selectors,
                                &report.services,
                                &report.target_info,
                            );
                            MatchedPlugin {
                                descriptor: sub,
                                services,
                            }
                        })
                        .collect();
                    matched_detectors.push(MatchedDetector::Remote {
                        descriptor: descriptor.clone(),
                        plugin: Arc::clone(plugin),
                        matched_services: report.services.clone(),
                        sub_matches,
                    });
                }
            }
        }

        matched_detectors
    }

    fn detector_allowed(&self, name: &str) -> bool {
        if let Some(include) = &self.detectors_include {
            if !include.iter().any(|included| included == name) {
                return false;
            }
        }
        if let Some(exclude) = &self.detectors_exclude {
            if exclude.iter().any(|excluded| excluded == name) {
                return false;
            }
        }
        true
    }
}
