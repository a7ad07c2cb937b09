// src/cli.rs
use std::path::PathBuf;

use clap::Parser;

use crate::core::ScanTarget;
use crate::error::{RiptideError, RiptideResult};

/// Exit code for argument validation failures.
pub const EXIT_USAGE: i32 = 64;

#[derive(Parser, Debug, Default)]
#[command(name = "riptide")]
#[command(about = "A plugin-driven network vulnerability scanner")]
pub struct Args {
    /// IPv4 address to scan
    #[arg(long = "ip-v4-target", value_name = "IP")]
    pub ip_v4_target: Option<String>,

    /// IPv6 address to scan
    #[arg(long = "ip-v6-target", value_name = "IP")]
    pub ip_v6_target: Option<String>,

    /// Hostname to scan; may be combined with an IP target for the same host
    #[arg(long = "hostname-target", value_name = "HOST")]
    pub hostname_target: Option<String>,

    /// URL to scan; derives hostname, port, scheme and application root
    #[arg(long = "uri-target", value_name = "URL")]
    pub uri_target: Option<String>,

    /// Comma-separated detector names to run exclusively
    #[arg(long = "detectors-include", value_name = "NAMES")]
    pub detectors_include: Option<String>,

    /// Comma-separated detector names to skip
    #[arg(long = "detectors-exclude", value_name = "NAMES")]
    pub detectors_exclude: Option<String>,

    /// Write all detector advisories to this file and exit without scanning
    #[arg(long = "dump-advisories", value_name = "PATH")]
    pub dump_advisories: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Write the scan results as JSON to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    /// Validate the target selector combination. A missing target is only
    /// acceptable in advisory-dump mode.
    pub fn validate(&self) -> RiptideResult<()> {
        if self.ip_v4_target.is_some() && self.ip_v6_target.is_some() {
            return Err(RiptideError::InvalidArgument {
                flag: "--ip-v6-target".to_string(),
                reason: "conflicts with --ip-v4-target".to_string(),
            });
        }
        if self.uri_target.is_some() {
            if self.hostname_target.is_some() {
                return Err(RiptideError::InvalidArgument {
                    flag: "--uri-target".to_string(),
                    reason: "conflicts with --hostname-target".to_string(),
                });
            }
            if self.ip_v4_target.is_some() || self.ip_v6_target.is_some() {
                return Err(RiptideError::InvalidArgument {
                    flag: "--uri-target".to_string(),
                    reason: "conflicts with IP targets".to_string(),
                });
            }
        }
        if !self.has_target() && self.dump_advisories.is_none() {
            return Err(RiptideError::InvalidArgument {
                flag: "target".to_string(),
                reason: "one of --ip-v4-target, --ip-v6-target, --hostname-target or \
                         --uri-target is required"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn has_target(&self) -> bool {
        self.ip_v4_target.is_some()
            || self.ip_v6_target.is_some()
            || self.hostname_target.is_some()
            || self.uri_target.is_some()
    }

    /// Build the scan target from the validated flags.
    pub async fn build_target(&self) -> RiptideResult<ScanTarget> {
        if let Some(uri) = &self.uri_target {
            return ScanTarget::from_uri(uri).await;
        }
        let (ip, flag) = match (&self.ip_v4_target, &self.ip_v6_target) {
            (Some(ip), _) => (Some(ip.as_str()), "--ip-v4-target"),
            (_, Some(ip)) => (Some(ip.as_str()), "--ip-v6-target"),
            _ => (None, ""),
        };
        match (ip, &self.hostname_target) {
            (Some(ip), Some(hostname)) => ScanTarget::for_ip_and_hostname(ip, hostname, flag),
            (Some(ip), None) => ScanTarget::for_ip(ip, flag),
            (None, Some(hostname)) => Ok(ScanTarget::for_hostname(hostname)),
            (None, None) => Err(RiptideError::InvalidArgument {
                flag: "target".to_string(),
                reason: "no scan target given".to_string(),
            }),
        }
    }

    /// Split a comma-separated detector name list, trimming whitespace.
    pub fn parse_name_filter(raw: &Option<String>) -> Option<Vec<String>> {
        raw.as_ref().map(|value| {
            value
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect()
        })
    }
}
