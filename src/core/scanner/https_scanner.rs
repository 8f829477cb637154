// src/core/scanner/https_scanner.rs

use crate::core::models::HttpsCheck;
use async_trait::async_trait;
use tracing::{info, warn};

/// Single HTTPS reachability check against a bare domain.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn check_https(&self, domain: &str) -> HttpsCheck;
}

pub struct HttpsProbe {
    client: reqwest::Client,
}

impl HttpsProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReachabilityProbe for HttpsProbe {
    /// Any HTTP response, whatever its status, means the host is reachable.
    /// Connection and TLS failures leave the status code empty.
    async fn check_https(&self, domain: &str) -> HttpsCheck {
        let url = format!("https://{}", domain);

        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                info!(url = %url, status = %status, "HTTPS endpoint reachable.");
                HttpsCheck {
                    reachable: true,
                    status_code: Some(status.as_u16()),
                }
            }
            Err(e) => {
                warn!(url = %url, error = %e, "HTTPS request failed.");
                HttpsCheck::unreachable()
            }
        }
    }
}
