// src/core/scanner/threat_scanner.rs

use crate::core::models::ThreatReport;
use async_trait::async_trait;
use std::net::IpAddr;
use tracing::{debug, info, warn};

/// Third-party host intelligence. Only wired in when a credential is
/// configured; a failed lookup is reported, not hidden.
#[async_trait]
pub trait ThreatEnrichment: Send + Sync {
    async fn enrich(&self, ip: IpAddr) -> ThreatReport;
}

/// Client for a Shodan-compatible `/shodan/host/{ip}` endpoint.
pub struct ShodanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ShodanClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl ThreatEnrichment for ShodanClient {
    async fn enrich(&self, ip: IpAddr) -> ThreatReport {
        let url = format!("{}/shodan/host/{}", self.base_url, ip);
        debug!(url = %url, "Requesting threat enrichment.");

        // The key goes in the query string; never log the full request URL.
        let response = match self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                let e = e.without_url();
                warn!(%ip, error = %e, "Threat enrichment request failed.");
                return failed(format!("request failed: {}", e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%ip, status = %status, "Threat enrichment returned a non-success status.");
            return failed(format!("HTTP {}", status));
        }

        match response.json::<serde_json::Value>().await {
            Ok(host) => {
                info!(%ip, "Threat enrichment retrieved.");
                ThreatReport::Host(host)
            }
            Err(e) => {
                let e = e.without_url();
                warn!(%ip, error = %e, "Threat enrichment body could not be parsed.");
                failed(format!("invalid response body: {}", e))
            }
        }
    }
}

fn failed(error: String) -> ThreatReport {
    ThreatReport::Failed { error }
}
