// src/core/scanner/registry_scanner.rs

use crate::core::models::{TargetKind, WhoisRecord};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};
use url::Url;

const WHOIS_PORT: u16 = 43;
const MAX_WHOIS_BYTES: u64 = 64 * 1024;
const RDAP_MEDIA_TYPE: &str = "application/rdap+json";

/// Registry metadata (RDAP) and ownership (WHOIS) lookups.
///
/// Both operations absorb every failure: network errors, non-success
/// responses and unparsable bodies all come back as `None`.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn lookup_registry(&self, target: &str, kind: TargetKind) -> Option<serde_json::Value>;
    async fn lookup_ownership(&self, domain: &str) -> Option<WhoisRecord>;
}

pub struct RdapWhoisClient {
    client: reqwest::Client,
    rdap_base_url: String,
    whois_server: String,
    timeout: Duration,
}

impl RdapWhoisClient {
    pub fn new(client: reqwest::Client, rdap_base_url: &str, whois_server: &str, timeout: Duration) -> Self {
        Self {
            client,
            rdap_base_url: rdap_base_url.trim_end_matches('/').to_string(),
            whois_server: whois_server.to_string(),
            timeout,
        }
    }

    fn rdap_url(&self, target: &str, kind: TargetKind) -> Option<Url> {
        let segment = match kind {
            TargetKind::Ip => "ip",
            TargetKind::Domain => "domain",
            TargetKind::Unclassified => return None,
        };
        Url::parse(&format!("{}/{}/{}", self.rdap_base_url, segment, target)).ok()
    }
}

#[async_trait]
impl RegistryClient for RdapWhoisClient {
    async fn lookup_registry(&self, target: &str, kind: TargetKind) -> Option<serde_json::Value> {
        let url = self.rdap_url(target, kind)?;
        debug!(url = %url, "Querying RDAP.");

        let response = match self
            .client
            .get(url.clone())
            .header(ACCEPT, RDAP_MEDIA_TYPE)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                warn!(url = %url, error = %e, "RDAP request failed.");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "RDAP returned a non-success status.");
            return None;
        }

        match response.json::<serde_json::Value>().await {
            Ok(doc) => {
                info!(target, "RDAP record retrieved.");
                Some(doc)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "RDAP body was not valid JSON.");
                None
            }
        }
    }

    async fn lookup_ownership(&self, domain: &str) -> Option<WhoisRecord> {
        let root_text = match whois_query(&self.whois_server, domain, self.timeout).await {
            Ok(text) => text,
            Err(e) => {
                warn!(server = %self.whois_server, domain, error = %e, "WHOIS query failed.");
                return None;
            }
        };
        let root_fields = parse_whois_text(&root_text);

        // The root server usually only knows the TLD and points at the registry.
        if let Some(referral) = referral_server(&root_fields).filter(|s| *s != self.whois_server) {
            debug!(referral, "Following WHOIS referral.");
            match whois_query(referral, domain, self.timeout).await {
                Ok(text) => {
                    let fields = parse_whois_text(&text);
                    if !fields.is_empty() {
                        info!(server = referral, "WHOIS record retrieved.");
                        return Some(WhoisRecord { server: referral.to_string(), fields });
                    }
                    warn!(server = referral, "WHOIS referral returned no fields.");
                }
                Err(e) => warn!(server = referral, domain, error = %e, "WHOIS referral failed."),
            }
        }

        if root_fields.is_empty() {
            debug!(domain, "WHOIS response contained no fields.");
            return None;
        }
        Some(WhoisRecord { server: self.whois_server.clone(), fields: root_fields })
    }
}

/// One RFC 3912 exchange: send the query line, read until the server closes.
async fn whois_query(server: &str, query: &str, timeout: Duration) -> Result<String, String> {
    let exchange = async {
        let mut stream = TcpStream::connect(split_server(server)).await?;
        stream.write_all(format!("{}\r\n", query).as_bytes()).await?;
        let mut buf = Vec::new();
        (&mut stream).take(MAX_WHOIS_BYTES).read_to_end(&mut buf).await?;
        Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
    };

    match tokio::time::timeout(timeout, exchange).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(format!("I/O error: {}", e)),
        Err(_) => Err("timed out".to_string()),
    }
}

/// `host:port` selects a non-standard port; a bare host uses port 43.
fn split_server(server: &str) -> (&str, u16) {
    server
        .rsplit_once(':')
        .filter(|(host, _)| !host.is_empty() && !host.contains(':'))
        .and_then(|(host, port)| port.parse().ok().map(|port| (host, port)))
        .unwrap_or((server, WHOIS_PORT))
}

/// Parses `key: value` lines, keeping the first value seen for each
/// lower-cased key. Comment and notice lines are skipped.
pub fn parse_whois_text(text: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') || line.starts_with(">>>") {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        if key.is_empty() || value.is_empty() || key.len() > 40 {
            continue;
        }
        fields.entry(key).or_insert_with(|| value.to_string());
    }
    fields
}

fn referral_server(fields: &BTreeMap<String, String>) -> Option<&str> {
    fields
        .get("refer")
        .or_else(|| fields.get("whois"))
        .or_else(|| fields.get("registrar whois server"))
        .map(|s| s.trim_start_matches("whois://").trim())
        .filter(|s| !s.is_empty())
}
