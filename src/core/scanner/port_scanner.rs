// src/core/scanner/port_scanner.rs

use crate::core::models::{PortProbeResult, PortStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinError, JoinSet};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

/// Candidate ports, in probe order. The deep profile scans a prefix of this list.
pub const COMMON_PORTS: &[u16] = &[
    80, 443, 21, 22, 25, 53, 110, 143, 161, 3306, 3389, 5900, 8080, 8443, 587, 993, 995, 2082,
    2083, 8444,
];

pub const DEFAULT_PORT_TIMEOUT: Duration = Duration::from_millis(1000);

const HOST_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// TCP connect probing. Returns exactly one result per requested port, in
/// the order requested, regardless of individual connect failures. Connects
/// still running at `deadline` are abandoned and reported as `Closed`.
#[async_trait]
pub trait PortScanner: Send + Sync {
    async fn scan_ports(
        &self,
        host: &str,
        ports: &[u16],
        timeout: Duration,
        deadline: Instant,
    ) -> Vec<PortProbeResult>;
}

/// Connect scanner with a fixed-size worker pool.
pub struct TcpPortScanner {
    concurrency: usize,
}

impl TcpPortScanner {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.clamp(1, 256),
        }
    }
}

#[async_trait]
impl PortScanner for TcpPortScanner {
    async fn scan_ports(
        &self,
        host: &str,
        ports: &[u16],
        timeout: Duration,
        deadline: Instant,
    ) -> Vec<PortProbeResult> {
        let Some(ip) = time::timeout_at(deadline, resolve_host(host)).await.ok().flatten() else {
            warn!(host, "Could not resolve scan host; every port is marked as error.");
            return ports
                .iter()
                .map(|&port| PortProbeResult { port, status: PortStatus::Error })
                .collect();
        };

        info!(%ip, ports = ports.len(), concurrency = self.concurrency, "Starting port scan.");

        let sem = Arc::new(Semaphore::new(self.concurrency));
        let mut set = JoinSet::new();
        // `None` until the task for that slot reports back.
        let mut statuses: Vec<Option<PortStatus>> = vec![None; ports.len()];
        let mut slots = HashMap::with_capacity(ports.len());
        let mut cut_off = false;

        for (index, &port) in ports.iter().enumerate() {
            // Acquire before spawning so at most `concurrency` sockets exist at once.
            let permit = match time::timeout_at(deadline, sem.clone().acquire_owned()).await {
                Ok(Ok(permit)) => permit,
                Ok(Err(_)) => break,
                Err(_) => {
                    cut_off = true;
                    break;
                }
            };
            let handle = set.spawn(async move {
                let _permit = permit;
                let status = ConnectProbe::new(SocketAddr::new(ip, port)).run(timeout).await;
                (index, status)
            });
            slots.insert(handle.id(), index);
        }

        while !cut_off {
            match time::timeout_at(deadline, set.join_next()).await {
                Ok(Some(joined)) => record_outcome(&mut statuses, &slots, joined),
                Ok(None) => break,
                Err(_) => cut_off = true,
            }
        }
        if cut_off {
            while let Some(joined) = set.try_join_next() {
                record_outcome(&mut statuses, &slots, joined);
            }
            let pending = statuses.iter().filter(|s| s.is_none()).count();
            warn!(%ip, pending, "Port scan reached the request deadline; unfinished ports count as closed.");
            set.abort_all();
        }

        let results: Vec<PortProbeResult> = ports
            .iter()
            .zip(statuses)
            .map(|(&port, status)| PortProbeResult {
                port,
                status: status.unwrap_or(PortStatus::Closed),
            })
            .collect();

        let open = results.iter().filter(|r| r.status == PortStatus::Open).count();
        info!(%ip, open, total = results.len(), "Port scan finished.");
        results
    }
}

/// A task that failed to report back (panic) leaves its slot as `Error`.
fn record_outcome(
    statuses: &mut [Option<PortStatus>],
    slots: &HashMap<task::Id, usize>,
    joined: Result<(usize, PortStatus), JoinError>,
) {
    match joined {
        Ok((index, status)) => statuses[index] = Some(status),
        Err(e) => {
            warn!(error = %e, "Port probe task did not complete.");
            if let Some(&index) = slots.get(&e.id()) {
                statuses[index] = Some(PortStatus::Error);
            }
        }
    }
}

/// Lifecycle of one connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeState {
    Connecting,
    Finished(PortStatus),
}

struct ConnectProbe {
    addr: SocketAddr,
    state: ProbeState,
}

impl ConnectProbe {
    fn new(addr: SocketAddr) -> Self {
        Self { addr, state: ProbeState::Connecting }
    }

    /// The only transition out of `Connecting`. Later calls keep the first outcome.
    fn complete(&mut self, status: PortStatus) -> PortStatus {
        match self.state {
            ProbeState::Connecting => {
                self.state = ProbeState::Finished(status);
                status
            }
            ProbeState::Finished(first) => first,
        }
    }

    async fn run(mut self, timeout: Duration) -> PortStatus {
        let status = match time::timeout(timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(_stream)) => PortStatus::Open,
            Ok(Err(e)) => classify_connect_error(&e),
            // No distinction between filtered and refused: both read as closed.
            Err(_elapsed) => PortStatus::Closed,
        };
        debug!(addr = %self.addr, %status, "Port probe finished.");
        self.complete(status)
    }
}

/// Remote-side refusals and unreachability are `Closed`; anything else is a
/// local failure and reported as `Error`.
fn classify_connect_error(e: &io::Error) -> PortStatus {
    match e.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::TimedOut
        | io::ErrorKind::HostUnreachable
        | io::ErrorKind::NetworkUnreachable => PortStatus::Closed,
        _ => PortStatus::Error,
    }
}

async fn resolve_host(host: &str) -> Option<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(ip);
    }
    match time::timeout(HOST_LOOKUP_TIMEOUT, tokio::net::lookup_host((host, 0))).await {
        Ok(Ok(addrs)) => {
            let addrs: Vec<SocketAddr> = addrs.collect();
            addrs
                .iter()
                .find(|a| a.is_ipv4())
                .or_else(|| addrs.first())
                .map(SocketAddr::ip)
        }
        Ok(Err(e)) => {
            debug!(host, error = %e, "Host lookup failed.");
            None
        }
        Err(_) => None,
    }
}
