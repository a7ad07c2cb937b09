// src/plugins/web_fingerprint.rs
use async_trait::async_trait;
use tracing::debug;

use crate::core::{
    FingerprintingReport, NetworkService, ServiceContext, Software, TargetInfo,
};
use crate::error::RiptideResult;
use crate::plugin::{PluginDescriptor, PluginType, Selectors, ServiceFingerprinter};
use crate::utils::http::HttpClient;

/// Fingerprints web services with a single probe request: the `Server`
/// response header becomes the identified software, and the service is
/// marked as a web application at the default root.
pub struct WebServiceFingerprinter {
    http_client: HttpClient,
}

impl WebServiceFingerprinter {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            PluginType::ServiceFingerprint,
            "WebServiceFingerprinter",
            "0.1.0",
            "Identifies software behind HTTP services from response headers.",
            "Riptide Team",
        )
        .with_selectors(Selectors::for_web_service())
    }

    fn probe_url(service: &NetworkService) -> String {
        let scheme = match service.service_name.as_deref() {
            Some("https") | Some("https-alt") | Some("ssl/http") | Some("ssl/https") => "https",
            _ => "http",
        };
        match service.endpoint.port() {
            Some(port) => format!("{}://{}:{}/", scheme, service.endpoint.host(), port),
            None => format!("{}://{}/", scheme, service.endpoint.host()),
        }
    }
}

#[async_trait]
impl ServiceFingerprinter for WebServiceFingerprinter {
    async fn fingerprint(
        &self,
        _target_info: &TargetInfo,
        service: &NetworkService,
    ) -> RiptideResult<FingerprintingReport> {
        let url = Self::probe_url(service);
        let response = self.http_client.get(&url).await?;

        let mut enriched = service.clone();
        if let Some(server) = response
            .headers()
            .get(reqwest::header::SERVER)
            .and_then(|value| value.to_str().ok())
        {
            debug!("Service {} reports Server: {}", service.endpoint, server);
            // "nginx/1.24.0" style values split into name and version.
            let mut parts = server.splitn(2, '/');
            let name = parts.next().unwrap_or(server).to_string();
            let version = parts.next().map(str::to_string);
            enriched = enriched.with_software(Software { name, version });
        }
        if enriched.application_root().is_none() {
            enriched = enriched.with_service_context(ServiceContext::web("/"));
        }

        Ok(FingerprintingReport {
            services: vec![enriched],
        })
    }
}
