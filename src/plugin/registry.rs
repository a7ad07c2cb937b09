// src/plugin/registry.rs
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{RiptideError, RiptideResult};

use super::{
    PluginDescriptor, PluginKind, PluginType, PortScanner, RemoteVulnDetector,
    ServiceFingerprinter, VulnDetector,
};

/// Process-wide catalog of installed plugins. Built once at startup from the
/// registered bootstrap bindings and immutable afterwards, so reads need no
/// locking.
pub struct PluginRegistry {
    entries: Vec<(PluginDescriptor, PluginKind)>,
    by_name: HashMap<String, usize>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("names", &self.by_name.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluginRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// All registered plugins in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &(PluginDescriptor, PluginKind)> {
        self.entries.iter()
    }

    /// Plugins of one type, preserving registration order.
    pub fn all_of_type(
        &self,
        plugin_type: PluginType,
    ) -> impl Iterator<Item = &(PluginDescriptor, PluginKind)> {
        self.entries
            .iter()
            .filter(move |(descriptor, _)| descriptor.plugin_type == plugin_type)
    }

    pub fn by_name(&self, name: &str) -> Option<&(PluginDescriptor, PluginKind)> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    pub fn port_scanners(
        &self,
    ) -> impl Iterator<Item = (&PluginDescriptor, &Arc<dyn PortScanner>)> {
        self.entries.iter().filter_map(|(descriptor, kind)| match kind {
            PluginKind::PortScanner(plugin) => Some((descriptor, plugin)),
            _ => None,
        })
    }

    pub fn service_fingerprinters(
        &self,
    ) -> impl Iterator<Item = (&PluginDescriptor, &Arc<dyn ServiceFingerprinter>)> {
        self.entries.iter().filter_map(|(descriptor, kind)| match kind {
            PluginKind::ServiceFingerprinter(plugin) => Some((descriptor, plugin)),
            _ => None,
        })
    }

    /// Local and remote detectors interleaved in registration order.
    pub fn detectors(&self) -> impl Iterator<Item = (&PluginDescriptor, DetectorRef<'_>)> {
        self.entries.iter().filter_map(|(descriptor, kind)| match kind {
            PluginKind::VulnDetector(plugin) => Some((descriptor, DetectorRef::Local(plugin))),
            PluginKind::RemoteVulnDetector(plugin) => {
                Some((descriptor, DetectorRef::Remote(plugin)))
            }
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A detector entry seen through the registry, local or remote.
pub enum DetectorRef<'a> {
    Local(&'a Arc<dyn VulnDetector>),
    Remote(&'a Arc<dyn RemoteVulnDetector>),
}

/// Collects bootstrap registrations and validates them into a
/// [`PluginRegistry`]. Registering two plugins under the same descriptor
/// name is a fatal startup error surfaced by [`RegistryBuilder::build`].
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<(PluginDescriptor, PluginKind)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_port_scanner(
        &mut self,
        descriptor: PluginDescriptor,
        plugin: Arc<dyn PortScanner>,
    ) -> &mut Self {
        self.register(descriptor, PluginKind::PortScanner(plugin))
    }

    pub fn register_service_fingerprinter(
        &mut self,
        descriptor: PluginDescriptor,
        plugin: Arc<dyn ServiceFingerprinter>,
    ) -> &mut Self {
        self.register(descriptor, PluginKind::ServiceFingerprinter(plugin))
    }

    pub fn register_vuln_detector(
        &mut self,
        descriptor: PluginDescriptor,
        plugin: Arc<dyn VulnDetector>,
    ) -> &mut Self {
        self.register(descriptor, PluginKind::VulnDetector(plugin))
    }

    pub fn register_remote_vuln_detector(
        &mut self,
        descriptor: PluginDescriptor,
        plugin: Arc<dyn RemoteVulnDetector>,
    ) -> &mut Self {
        self.register(descriptor, PluginKind::RemoteVulnDetector(plugin))
    }

    fn register(&mut self, descriptor: PluginDescriptor, kind: PluginKind) -> &mut Self {
        debug!(
            "Registering {} plugin '{}'",
            kind.plugin_type().as_str(),
            descriptor.name
        );
        self.entries.push((descriptor, kind));
        self
    }

    pub fn build(self) -> RiptideResult<PluginRegistry> {
        let mut by_name = HashMap::with_capacity(self.entries.len());
        for (idx, (descriptor, _)) in self.entries.iter().enumerate() {
            if by_name.insert(descriptor.name.clone(), idx).is_some() {
                return Err(RiptideError::DuplicatePluginName(descriptor.name.clone()));
            }
        }
        info!("Plugin registry built with {} plugins", self.entries.len());
        Ok(PluginRegistry {
            entries: self.entries,
            by_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::testing::{FakePortScanner, FakePortScanner2, FakeVulnDetector};

    #[test]
    fn build_preserves_registration_order() {
        let mut builder = RegistryBuilder::new();
        builder.register_port_scanner(FakePortScanner::descriptor(), Arc::new(FakePortScanner));
        builder.register_port_scanner(FakePortScanner2::descriptor(), Arc::new(FakePortScanner2));
        let registry = builder.build().unwrap();

        let names: Vec<_> = registry
            .port_scanners()
            .map(|(descriptor, _)| descriptor.name.as_str())
            .collect();
        assert_eq!(names, vec!["FakePortScanner", "FakePortScanner2"]);
    }

    #[test]
    fn build_fails_on_duplicate_name() {
        let mut builder = RegistryBuilder::new();
        builder.register_port_scanner(FakePortScanner::descriptor(), Arc::new(FakePortScanner));
        builder.register_port_scanner(FakePortScanner::descriptor(), Arc::new(FakePortScanner));

        match builder.build() {
            Err(RiptideError::DuplicatePluginName(name)) => assert_eq!(name, "FakePortScanner"),
            other => panic!("expected duplicate name error, got {other:?}"),
        }
    }

    #[test]
    fn by_name_finds_registered_plugins() {
        let mut builder = RegistryBuilder::new();
        builder.register_vuln_detector(FakeVulnDetector::descriptor(), Arc::new(FakeVulnDetector));
        let registry = builder.build().unwrap();

        assert!(registry.by_name("FakeVulnDetector").is_some());
        assert!(registry.by_name("NoSuchPlugin").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn all_of_type_filters_by_plugin_type() {
        let mut builder = RegistryBuilder::new();
        builder.register_port_scanner(FakePortScanner::descriptor(), Arc::new(FakePortScanner));
        builder.register_vuln_detector(FakeVulnDetector::descriptor(), Arc::new(FakeVulnDetector));
        let registry = builder.build().unwrap();

        assert_eq!(registry.all_of_type(PluginType::PortScan).count(), 1);
        assert_eq!(registry.all_of_type(PluginType::VulnDetection).count(), 1);
        assert_eq!(registry.all_of_type(PluginType::ServiceFingerprint).count(), 0);
    }
}
