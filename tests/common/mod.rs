// Test doubles shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use vanguard_recon::core::models::{
    GeoRecord, HttpsCheck, PortProbeResult, PortStatus, TargetKind, ThreatReport, WhoisRecord,
};
use vanguard_recon::core::scanner::dns_scanner::Resolver;
use vanguard_recon::core::scanner::geo_scanner::GeoClient;
use vanguard_recon::core::scanner::https_scanner::ReachabilityProbe;
use vanguard_recon::core::scanner::port_scanner::PortScanner;
use vanguard_recon::core::scanner::registry_scanner::RegistryClient;
use vanguard_recon::core::scanner::threat_scanner::ThreatEnrichment;
use vanguard_recon::core::scanner::{Collaborators, ScanOrchestrator, ScanSettings};

pub const RESOLVED: &str = "93.184.216.34";

/// Counts every collaborator call so tests can assert nothing ran.
#[derive(Default)]
pub struct Calls {
    pub resolve: AtomicUsize,
    pub registry: AtomicUsize,
    pub whois: AtomicUsize,
    pub geo: AtomicUsize,
    pub https: AtomicUsize,
    pub ports: AtomicUsize,
    pub threat: AtomicUsize,
}

impl Calls {
    pub fn total(&self) -> usize {
        [
            &self.resolve,
            &self.registry,
            &self.whois,
            &self.geo,
            &self.https,
            &self.ports,
            &self.threat,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }

    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Knobs for the fake network.
#[derive(Clone)]
pub struct Behaviour {
    pub resolves: bool,
    pub registry_ok: bool,
    pub https_ok: bool,
    pub operator: &'static str,
    pub threat_ok: bool,
    pub open_ports: Vec<u16>,
    pub port_delay: Duration,
    pub registry_delay: Duration,
    pub https_delay: Duration,
    pub geo_delay: Duration,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            resolves: true,
            registry_ok: true,
            https_ok: true,
            operator: "Example Regional ISP",
            threat_ok: true,
            open_ports: vec![80, 443],
            port_delay: Duration::ZERO,
            registry_delay: Duration::ZERO,
            https_delay: Duration::ZERO,
            geo_delay: Duration::ZERO,
        }
    }
}

pub struct FakeNet {
    pub calls: Arc<Calls>,
    behaviour: Behaviour,
}

#[async_trait]
impl Resolver for FakeNet {
    async fn resolve(&self, _hostname: &str) -> Option<IpAddr> {
        self.calls.resolve.fetch_add(1, Ordering::SeqCst);
        self.behaviour.resolves.then(|| RESOLVED.parse().unwrap())
    }
}

#[async_trait]
impl RegistryClient for FakeNet {
    async fn lookup_registry(&self, target: &str, _kind: TargetKind) -> Option<serde_json::Value> {
        self.calls.registry.fetch_add(1, Ordering::SeqCst);
        pause(self.behaviour.registry_delay).await;
        self.behaviour
            .registry_ok
            .then(|| json!({ "handle": "EX-1", "ldhName": target }))
    }

    async fn lookup_ownership(&self, domain: &str) -> Option<WhoisRecord> {
        self.calls.whois.fetch_add(1, Ordering::SeqCst);
        pause(self.behaviour.registry_delay).await;
        let mut fields = BTreeMap::new();
        fields.insert("domain".to_string(), domain.to_uppercase());
        Some(WhoisRecord { server: "whois.example".to_string(), fields })
    }
}

#[async_trait]
impl GeoClient for FakeNet {
    async fn geolocate(&self, _ip: IpAddr) -> Option<GeoRecord> {
        self.calls.geo.fetch_add(1, Ordering::SeqCst);
        pause(self.behaviour.geo_delay).await;
        Some(GeoRecord {
            country: Some("United States".to_string()),
            operator: Some(self.behaviour.operator.to_string()),
            ..GeoRecord::default()
        })
    }
}

#[async_trait]
impl ReachabilityProbe for FakeNet {
    async fn check_https(&self, _domain: &str) -> HttpsCheck {
        self.calls.https.fetch_add(1, Ordering::SeqCst);
        pause(self.behaviour.https_delay).await;
        if self.behaviour.https_ok {
            HttpsCheck { reachable: true, status_code: Some(200) }
        } else {
            HttpsCheck::unreachable()
        }
    }
}

#[async_trait]
impl PortScanner for FakeNet {
    async fn scan_ports(
        &self,
        _host: &str,
        ports: &[u16],
        _timeout: Duration,
        deadline: Instant,
    ) -> Vec<PortProbeResult> {
        self.calls.ports.fetch_add(1, Ordering::SeqCst);
        let finished_at = Instant::now() + self.behaviour.port_delay;
        let finished = finished_at <= deadline;
        tokio::time::sleep_until(finished_at.min(deadline)).await;

        // Like the real scanner: ports still pending at the deadline read as closed.
        ports
            .iter()
            .map(|&port| PortProbeResult {
                port,
                status: if finished && self.behaviour.open_ports.contains(&port) {
                    PortStatus::Open
                } else {
                    PortStatus::Closed
                },
            })
            .collect()
    }
}

#[async_trait]
impl ThreatEnrichment for FakeNet {
    async fn enrich(&self, ip: IpAddr) -> ThreatReport {
        self.calls.threat.fetch_add(1, Ordering::SeqCst);
        if self.behaviour.threat_ok {
            ThreatReport::Host(json!({ "ip_str": ip.to_string(), "org": "Example Org", "vulns": [] }))
        } else {
            ThreatReport::Failed { error: "HTTP status client error (403 Forbidden)".to_string() }
        }
    }
}

/// Builds an orchestrator over the fake network. `with_threat` decides
/// whether enrichment is configured at all.
pub fn orchestrator(behaviour: Behaviour, with_threat: bool) -> (ScanOrchestrator, Arc<Calls>) {
    orchestrator_with(behaviour, with_threat, ScanSettings::default())
}

pub fn orchestrator_with(
    behaviour: Behaviour,
    with_threat: bool,
    settings: ScanSettings,
) -> (ScanOrchestrator, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let net = Arc::new(FakeNet { calls: Arc::clone(&calls), behaviour });
    let probes = Collaborators {
        resolver: net.clone(),
        registry: net.clone(),
        geo: net.clone(),
        https: net.clone(),
        ports: net.clone(),
        threat: with_threat.then(|| net.clone() as Arc<dyn ThreatEnrichment>),
    };
    (ScanOrchestrator::new(probes, settings), calls)
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

pub async fn allow() -> bool {
    true
}

pub async fn deny() -> bool {
    false
}
