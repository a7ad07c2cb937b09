// src/reporting/advisories.rs
use std::fmt::Write as _;
use std::path::Path;

use tracing::info;

use crate::core::Vulnerability;
use crate::error::{RiptideError, RiptideResult};
use crate::plugin::registry::DetectorRef;
use crate::plugin::PluginRegistry;

/// All advisories the installed detectors can report, in registry order.
pub fn collect_advisories(registry: &PluginRegistry) -> Vec<Vulnerability> {
    registry
        .detectors()
        .flat_map(|(_, detector)| match detector {
            DetectorRef::Local(plugin) => plugin.advisories(),
            DetectorRef::Remote(plugin) => plugin.advisories(),
        })
        .collect()
}

/// Render advisories as newline-delimited text-format blocks.
pub fn render_advisories(advisories: &[Vulnerability]) -> String {
    let mut out = String::new();
    for advisory in advisories {
        out.push_str("vulnerabilities {\n");
        out.push_str("  main_id {\n");
        let _ = writeln!(out, "    publisher: \"{}\"", advisory.main_id.publisher);
        let _ = writeln!(out, "    value: \"{}\"", advisory.main_id.value);
        out.push_str("  }\n");
        let _ = writeln!(out, "  severity: {}", advisory.severity);
        let _ = writeln!(out, "  title: \"{}\"", advisory.title);
        let _ = writeln!(out, "  description: \"{}\"", advisory.description);
        out.push_str("}\n");
    }
    out
}

/// Write every installed detector's advisories to a file.
pub fn dump_advisories(registry: &PluginRegistry, path: &Path) -> RiptideResult<()> {
    let advisories = collect_advisories(registry);
    info!(
        "Dumping {} advisories to {}",
        advisories.len(),
        path.display()
    );
    std::fs::write(path, render_advisories(&advisories)).map_err(|e| RiptideError::FileError {
        path: path.to_path_buf(),
        message: format!("Failed to write advisories: {}", e),
    })
}
