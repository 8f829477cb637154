// src/core/scanner/dns_scanner.rs

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};

/// Forward DNS lookup. Every failure collapses to `None`.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, hostname: &str) -> Option<IpAddr>;
}

/// System-independent resolver backed by hickory, one attempt per lookup.
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl DnsResolver {
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
            timeout,
        }
    }
}

#[async_trait]
impl Resolver for DnsResolver {
    async fn resolve(&self, hostname: &str) -> Option<IpAddr> {
        // Strip a trailing dot so "example.com." and "example.com" behave alike.
        let hostname = hostname.trim().trim_end_matches('.');
        if hostname.is_empty() {
            return None;
        }

        debug!(target = hostname, "Resolving host.");
        match tokio::time::timeout(self.timeout, self.resolver.lookup_ip(hostname)).await {
            Ok(Ok(lookup)) => {
                // Prefer IPv4; the geolocation and port probes are tuned for it.
                let ip = lookup
                    .iter()
                    .find(IpAddr::is_ipv4)
                    .or_else(|| lookup.iter().next());
                debug!(target = hostname, ip = ?ip, "Resolution finished.");
                ip
            }
            Ok(Err(e)) => {
                warn!(target = hostname, error = %e, "DNS lookup failed.");
                None
            }
            Err(_) => {
                warn!(target = hostname, timeout_ms = self.timeout.as_millis() as u64, "DNS lookup timed out.");
                None
            }
        }
    }
}
