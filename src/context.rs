// src/context.rs
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::engine::{ExecutionEngine, ScanWorkflow};
use crate::error::{RiptideError, RiptideResult};
use crate::plugin::{PluginManager, PluginRegistry, RegistryBuilder};
use crate::plugins;
use crate::utils::http::HttpClient;

/// Application context wiring every component by explicit construction:
/// configuration, the shared HTTP client, the plugin registry, and the
/// execution engine. Tests build a smaller context with fake plugins.
pub struct Context {
    pub config: AppConfig,
    pub http_client: HttpClient,
    pub registry: Arc<PluginRegistry>,
    pub engine: Arc<ExecutionEngine>,
    detectors_include: Option<Vec<String>>,
    detectors_exclude: Option<Vec<String>>,
}

impl Context {
    /// Build the full context with the built-in plugins registered. The CLI
    /// detector filters override the configured ones.
    pub fn new(
        config: AppConfig,
        detectors_include: Option<Vec<String>>,
        detectors_exclude: Option<Vec<String>>,
    ) -> RiptideResult<Self> {
        let http_client = HttpClient::from_config(&config.http)
            .map_err(|e| RiptideError::ConfigError(e.to_string()))?;

        let mut builder = RegistryBuilder::new();
        plugins::register_builtin_plugins(&mut builder, &config, &http_client);
        let registry = Arc::new(builder.build()?);

        let engine = Arc::new(ExecutionEngine::from_config(&config.engine));

        let detectors_include = detectors_include.or_else(|| config.scan.detectors_include.clone());
        let detectors_exclude = detectors_exclude.or_else(|| config.scan.detectors_exclude.clone());

        Ok(Self {
            config,
            http_client,
            registry,
            engine,
            detectors_include,
            detectors_exclude,
        })
    }

    pub fn plugin_manager(&self) -> PluginManager {
        PluginManager::new(Arc::clone(&self.registry)).with_detector_filters(
            self.detectors_include.clone(),
            self.detectors_exclude.clone(),
        )
    }

    pub fn workflow(&self) -> ScanWorkflow {
        ScanWorkflow::new(self.plugin_manager(), Arc::clone(&self.engine))
            .with_deadline(self.config.scan.deadline_secs.map(Duration::from_secs))
            .with_grace(Duration::from_secs(self.config.engine.shutdown_grace_secs))
    }
}
