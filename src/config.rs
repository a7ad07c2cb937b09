// src/config.rs
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub scan: ScanConfig,
    pub http: HttpConfig,
}

/// Execution engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Size of the shared worker pool.
    pub max_workers: usize,
    /// Hard per-plugin execution timeout.
    pub plugin_timeout_secs: u64,
    /// Grace period for draining in-flight plugins after the scan deadline.
    pub shutdown_grace_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            plugin_timeout_secs: 3600,
            shutdown_grace_secs: 30,
        }
    }
}

fn default_max_workers() -> usize {
    std::cmp::min(32, num_cpus::get() * 4)
}

/// Scan workflow settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Overall scan deadline. None means no deadline.
    pub deadline_secs: Option<u64>,
    /// Detector whitelist by descriptor name.
    pub detectors_include: Option<Vec<String>>,
    /// Detector blacklist by descriptor name.
    pub detectors_exclude: Option<Vec<String>>,
    /// Ports probed by the built-in TCP connect scanner.
    pub ports: Vec<u16>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            deadline_secs: None,
            detectors_include: None,
            detectors_exclude: None,
            ports: default_ports(),
        }
    }
}

/// Most common service ports, in rough frequency order.
fn default_ports() -> Vec<u16> {
    vec![
        80, 443, 22, 21, 23, 25, 3389, 110, 445, 993, 143, 53, 135, 3306, 8080, 8443, 587, 1433,
        5432, 9100, 3000, 8000, 8888, 5900, 6379, 27017, 9200, 11211, 2049, 10000,
    ]
}

/// Shared HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Accept invalid or self-signed TLS certificates when probing targets.
    /// Off by default; only enable for lab targets with broken certificates.
    pub insecure_skip_tls_verify: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("riptide/{}", env!("CARGO_PKG_VERSION")),
            insecure_skip_tls_verify: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a file, or fall back to defaults when no file
    /// exists at the default location.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = Self::default_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read config {}: {}", path.display(), e))?;
        let config = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".riptide/config.toml")
    }
}
