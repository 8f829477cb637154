// src/core/scanner/mod.rs

// Each collaborator lives in its own module behind a trait, so the
// orchestrator below can be driven by real network clients or test doubles.
pub mod dns_scanner;
pub mod geo_scanner;
pub mod https_scanner;
pub mod port_scanner;
pub mod registry_scanner;
pub mod threat_scanner;

#[cfg(test)]
mod test_support;

use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use strum::Display;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::config::{Config, USER_AGENT};
use crate::core::error::ScanError;
use crate::core::models::{
    GeoRecord, HttpsCheck, Profile, ScanRecord, ScanTarget, TargetKind, ThreatReport, WhoisRecord,
};
use crate::core::scoring;

use self::dns_scanner::{DnsResolver, Resolver};
use self::geo_scanner::{GeoClient, IpApiClient};
use self::https_scanner::{HttpsProbe, ReachabilityProbe};
use self::port_scanner::{PortScanner, TcpPortScanner, COMMON_PORTS, DEFAULT_PORT_TIMEOUT};
use self::registry_scanner::{RdapWhoisClient, RegistryClient};
use self::threat_scanner::{ShodanClient, ThreatEnrichment};

pub const UNCLASSIFIED_HINT: &str = "Target is neither an IPv4 address nor a domain name, so no network probes were run. Pass an explicit kind to override the classification.";

/// The set of probes one orchestrator drives. `threat` is `None` when no
/// credential is configured, in which case enrichment is never invoked.
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn Resolver>,
    pub registry: Arc<dyn RegistryClient>,
    pub geo: Arc<dyn GeoClient>,
    pub https: Arc<dyn ReachabilityProbe>,
    pub ports: Arc<dyn PortScanner>,
    pub threat: Option<Arc<dyn ThreatEnrichment>>,
}

impl Collaborators {
    /// Wires the real network clients. All HTTP collaborators share one client.
    pub fn from_config(config: &Config) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.http_timeout)
            .build()?;

        let threat = config.threat_api_key.as_deref().map(|key| {
            Arc::new(ShodanClient::new(client.clone(), &config.threat_base_url, key)) as Arc<dyn ThreatEnrichment>
        });

        Ok(Self {
            resolver: Arc::new(DnsResolver::new(config.dns_timeout)),
            registry: Arc::new(RdapWhoisClient::new(
                client.clone(),
                &config.rdap_base_url,
                &config.whois_server,
                config.http_timeout,
            )),
            geo: Arc::new(IpApiClient::new(client.clone(), &config.geo_base_url)),
            https: Arc::new(HttpsProbe::new(client)),
            ports: Arc::new(TcpPortScanner::new(config.port_concurrency)),
            threat,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    pub port_timeout: Duration,
    /// How many entries of `COMMON_PORTS` the deep profile probes.
    pub deep_port_count: usize,
    /// Upper bound for the whole request; probes still running when it
    /// expires are abandoned and count as failed.
    pub request_deadline: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            port_timeout: DEFAULT_PORT_TIMEOUT,
            deep_port_count: 10,
            request_deadline: Duration::from_secs(20),
        }
    }
}

impl From<&Config> for ScanSettings {
    fn from(config: &Config) -> Self {
        Self {
            port_timeout: config.port_timeout,
            deep_port_count: config.deep_port_count,
            request_deadline: config.request_deadline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
enum ScanPhase {
    Classified,
    Enriching,
    Scored,
    Returned,
}

#[derive(Clone)]
pub struct ScanOrchestrator {
    probes: Collaborators,
    settings: ScanSettings,
}

impl ScanOrchestrator {
    pub fn new(probes: Collaborators, settings: ScanSettings) -> Self {
        Self { probes, settings }
    }

    pub fn from_config(config: &Config) -> Result<Self, ScanError> {
        Ok(Self::new(Collaborators::from_config(config)?, ScanSettings::from(config)))
    }

    pub fn deep_ports(&self) -> &'static [u16] {
        &COMMON_PORTS[..self.settings.deep_port_count.min(COMMON_PORTS.len())]
    }

    /// Runs one scan.
    ///
    /// Only an empty target, or a deep request that `authorize` rejects, is an
    /// error. `authorize` is awaited for the deep profile only, and before any
    /// probe starts. Every other failure ends up as an absent field.
    pub async fn run<F, Fut>(
        &self,
        target: &str,
        explicit_kind: Option<TargetKind>,
        profile: Profile,
        authorize: F,
    ) -> Result<ScanRecord, ScanError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        if target.trim().is_empty() {
            return Err(ScanError::InvalidInput("target must not be empty".to_string()));
        }

        let target = ScanTarget::new(target, explicit_kind);
        debug!(target = %target.raw, kind = %target.kind, phase = %ScanPhase::Classified, "Target classified.");

        if profile == Profile::Deep && !authorize().await {
            warn!(target = %target.raw, "Deep scan rejected: authorization failed.");
            return Err(ScanError::AuthorizationDenied(
                "the deep profile requires a valid authorization token".to_string(),
            ));
        }

        info!(target = %target.raw, kind = %target.kind, %profile, "Starting scan.");
        let mut record = ScanRecord::new(&target, profile);

        if target.kind == TargetKind::Unclassified {
            record.hint = Some(UNCLASSIFIED_HINT.to_string());
        } else {
            debug!(phase = %ScanPhase::Enriching, "Dispatching probes.");
            let deadline = Instant::now() + self.settings.request_deadline;
            match profile {
                Profile::Basic => self.run_basic(&target, &mut record, deadline).await,
                Profile::Deep => self.run_deep(&target, &mut record, deadline).await,
            }
        }

        record.score = scoring::score(&record.checks, record.geo.as_ref());
        debug!(score = record.score, phase = %ScanPhase::Scored, "Record scored.");

        info!(
            target = %record.target,
            score = record.score,
            resolved_ip = ?record.resolved_ip,
            phase = %ScanPhase::Returned,
            "Scan finished."
        );
        Ok(record)
    }

    async fn run_basic(&self, target: &ScanTarget, record: &mut ScanRecord, deadline: Instant) {
        let host = target.raw.as_str();
        let is_domain = target.kind == TargetKind::Domain;

        // Geolocation hangs off resolution only, never off the slower lookups.
        let (registry, whois, https, (resolved, geo)) = tokio::join!(
            within(deadline, self.probes.registry.lookup_registry(host, target.kind)),
            self.ownership(target, deadline),
            async {
                if !is_domain {
                    return None;
                }
                let check = within(deadline, self.probes.https.check_https(host)).await;
                Some(check.unwrap_or_else(HttpsCheck::unreachable))
            },
            async {
                let resolved = self.resolve(target, deadline).await;
                (resolved, self.geolocate(resolved, deadline).await)
            }
        );

        let registry = registry.flatten();
        record.checks.rdap = Some(registry.is_some());
        record.registry = registry;
        record.whois = whois;
        record.resolved_ip = resolved;
        record.geo = geo;
        if let Some(check) = https {
            record.checks.https = Some(check.reachable);
            record.https = Some(check);
        }
    }

    async fn run_deep(&self, target: &ScanTarget, record: &mut ScanRecord, deadline: Instant) {
        let host = target.raw.as_str();

        let (whois, registry, (resolved, geo, port_results, threat)) = tokio::join!(
            self.ownership(target, deadline),
            within(deadline, self.probes.registry.lookup_registry(host, target.kind)),
            async {
                let resolved = self.resolve(target, deadline).await;

                // IP targets are always port scanned, even when the literal does not
                // parse; the scanner then reports its own resolution failure per port.
                let scan_host = match target.kind {
                    TargetKind::Ip => Some(host.to_string()),
                    _ => resolved.map(|ip| ip.to_string()),
                };

                let (geo, ports, threat) = tokio::join!(
                    self.geolocate(resolved, deadline),
                    async {
                        let host = scan_host.as_deref()?;
                        Some(
                            self.probes
                                .ports
                                .scan_ports(host, self.deep_ports(), self.settings.port_timeout, deadline)
                                .await,
                        )
                    },
                    async {
                        let (ip, enrichment) = (resolved?, self.probes.threat.as_ref()?);
                        let report = within(deadline, enrichment.enrich(ip)).await;
                        Some(report.unwrap_or_else(|| ThreatReport::Failed {
                            error: "request deadline exceeded".to_string(),
                        }))
                    },
                );
                (resolved, geo, ports, threat)
            }
        );

        let registry = registry.flatten();
        record.checks.rdap = Some(registry.is_some());
        record.registry = registry;
        record.whois = whois;
        record.resolved_ip = resolved;
        record.geo = geo;
        record.ports = port_results;
        record.threat = threat;
    }

    async fn geolocate(&self, resolved: Option<IpAddr>, deadline: Instant) -> Option<GeoRecord> {
        let ip = resolved?;
        within(deadline, self.probes.geo.geolocate(ip)).await.flatten()
    }

    async fn ownership(&self, target: &ScanTarget, deadline: Instant) -> Option<WhoisRecord> {
        if target.kind != TargetKind::Domain {
            return None;
        }
        within(deadline, self.probes.registry.lookup_ownership(&target.raw))
            .await
            .flatten()
    }

    /// Domains go through DNS; IP targets are used as given.
    async fn resolve(&self, target: &ScanTarget, deadline: Instant) -> Option<IpAddr> {
        match target.kind {
            TargetKind::Domain => within(deadline, self.probes.resolver.resolve(&target.raw))
                .await
                .flatten(),
            TargetKind::Ip => target.raw.parse().ok(),
            TargetKind::Unclassified => None,
        }
    }
}

/// Runs `fut` until the request deadline; `None` if the deadline won.
async fn within<T>(deadline: Instant, fut: impl Future<Output = T>) -> Option<T> {
    time::timeout_at(deadline, fut).await.ok()
}
