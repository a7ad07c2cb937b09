// src/reporting/mod.rs
pub mod advisories;

use std::path::Path;

use tracing::info;

use crate::core::ScanResults;
use crate::error::{RiptideError, RiptideResult};

pub use advisories::{collect_advisories, dump_advisories, render_advisories};

/// Archive the final scan results as pretty-printed JSON.
pub fn write_scan_results(results: &ScanResults, path: &Path) -> RiptideResult<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json).map_err(|e| RiptideError::FileError {
        path: path.to_path_buf(),
        message: format!("Failed to write scan results: {}", e),
    })?;
    info!("Scan results written to {}", path.display());
    Ok(())
}

/// One-line summary of the scan outcome for the terminal.
pub fn print_summary(results: &ScanResults) {
    println!(
        "Scan {} in {:.2}s: {} services, {} findings",
        results.status,
        results.duration.as_secs_f64(),
        results.reconnaissance_report.services.len(),
        results.scan_findings.len()
    );
    if !results.status_message.is_empty() {
        println!("  {}", results.status_message);
    }
    for finding in &results.scan_findings {
        println!(
            "  [{}] {} on {} ({})",
            finding.vulnerability.severity,
            finding.vulnerability.title,
            finding.service.endpoint,
            finding.vulnerability.main_id.value
        );
    }
}
