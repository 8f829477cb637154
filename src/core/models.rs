// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use strum::{Display, EnumString};

// --- Target & Profile ---

/// What kind of identifier the user handed us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TargetKind {
    Domain,
    Ip,
    Unclassified,
}

/// Which probe set to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Profile {
    #[default]
    Basic,
    Deep,
}

/// The raw input together with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub raw: String,
    pub kind: TargetKind,
}

// --- Port Scanner Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PortStatus {
    Open,
    Closed,
    Error,
}

/// Outcome of one TCP connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortProbeResult {
    pub port: u16,
    pub status: PortStatus,
}

// --- Check Flags ---

/// Named boolean checks. `None` means the check was not attempted for this
/// profile and target kind, so it is left out of the serialized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rdap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https: Option<bool>,
}

// --- Collaborator Records ---

/// Geographic and network-operator metadata for an address.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoRecord {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    /// Network operator (ISP) name; the scorer looks for cloud providers here.
    pub operator: Option<String>,
    pub organization: Option<String>,
    pub asn: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Ownership record from a port-43 WHOIS exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisRecord {
    /// Server that produced the final answer.
    pub server: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HttpsCheck {
    pub reachable: bool,
    pub status_code: Option<u16>,
}

impl HttpsCheck {
    pub fn unreachable() -> Self {
        Self::default()
    }
}

/// Threat-intelligence outcome. A failed lookup keeps an error description so
/// "configured but failed" stays distinguishable from "not configured"
/// (which is simply an absent field on the record).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ThreatReport {
    Failed { error: String },
    Host(serde_json::Value),
}

// Only an object whose sole key is a string `error` reads back as a failure.
// A host document may carry its own `error` field next to real data.
impl<'de> Deserialize<'de> for ThreatReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if let Some(map) = value.as_object() {
            if map.len() == 1 {
                if let Some(serde_json::Value::String(error)) = map.get("error") {
                    return Ok(ThreatReport::Failed { error: error.clone() });
                }
            }
        }
        Ok(ThreatReport::Host(value))
    }
}

// --- Main Record ---

/// The unified result of one scan request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub target: String,
    pub kind: TargetKind,
    pub profile: Profile,
    pub timestamp: DateTime<Utc>,
    pub resolved_ip: Option<IpAddr>,
    pub checks: CheckFlags,
    /// Opaque RDAP document.
    pub registry: Option<serde_json::Value>,
    pub whois: Option<WhoisRecord>,
    pub geo: Option<GeoRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https: Option<HttpsCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<PortProbeResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat: Option<ThreatReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub score: u8,
}

impl ScanRecord {
    /// An empty record for `target`, to be filled in by the probes.
    pub fn new(target: &ScanTarget, profile: Profile) -> Self {
        Self {
            target: target.raw.clone(),
            kind: target.kind,
            profile,
            timestamp: Utc::now(),
            resolved_ip: None,
            checks: CheckFlags::default(),
            registry: None,
            whois: None,
            geo: None,
            https: None,
            ports: None,
            threat: None,
            hint: None,
            score: 0,
        }
    }

    pub fn open_ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports
            .iter()
            .flatten()
            .filter(|p| p.status == PortStatus::Open)
            .map(|p| p.port)
    }
}

// --- Wire Shapes ---

/// Transport-agnostic scan request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub target: String,
    #[serde(default)]
    pub kind: Option<TargetKind>,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub authorization_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ErrorKind {
    InvalidInput,
    AuthorizationDenied,
    Internal,
}

/// Structured error returned in place of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}
