// src/plugins/mod.rs
//
// Built-in plugins. External plugins register through the same bootstrap
// path: a descriptor plus an instance handed to the registry builder.

pub mod tcp_connect;
pub mod web_fingerprint;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::plugin::RegistryBuilder;
use crate::utils::http::HttpClient;

pub use tcp_connect::TcpConnectPortScanner;
pub use web_fingerprint::WebServiceFingerprinter;

/// Register the plugins that ship with the scanner.
pub fn register_builtin_plugins(
    builder: &mut RegistryBuilder,
    config: &AppConfig,
    http_client: &HttpClient,
) {
    builder.register_port_scanner(
        TcpConnectPortScanner::descriptor(),
        Arc::new(TcpConnectPortScanner::new(config.scan.ports.clone())),
    );
    builder.register_service_fingerprinter(
        WebServiceFingerprinter::descriptor(),
        Arc::new(WebServiceFingerprinter::new(http_client.clone())),
    );
}
