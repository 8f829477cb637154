// src/core/scoring.rs

//! Fixed-weight heuristic risk score.
//!
//! The weights are placeholders, not a calibrated model. Changing them is a
//! product decision, so they live here as plain constants.

use crate::core::models::{CheckFlags, GeoRecord};
use tracing::debug;

pub const BASELINE: i32 = 50;
pub const HTTPS_FAILED_PENALTY: i32 = 15;
pub const REGISTRY_FAILED_PENALTY: i32 = 10;
pub const CLOUD_OPERATOR_BONUS: i32 = 8;

/// Lower-case substrings identifying major cloud providers in an operator name.
pub const CLOUD_PROVIDER_TOKENS: &[&str] = &[
    "amazon",
    "google",
    "microsoft",
    "azure",
    "cloudflare",
    "digitalocean",
    "akamai",
    "oracle",
    "linode",
    "ovh",
    "hetzner",
];

/// Scores a set of checks. Pure: the same inputs always give the same score.
pub fn score(checks: &CheckFlags, geo: Option<&GeoRecord>) -> u8 {
    let mut score = BASELINE;

    if checks.https == Some(false) {
        score += HTTPS_FAILED_PENALTY;
    }
    if checks.rdap == Some(false) {
        score += REGISTRY_FAILED_PENALTY;
    }
    if geo.is_some_and(is_cloud_hosted) {
        score -= CLOUD_OPERATOR_BONUS;
    }

    let clamped = score.clamp(0, 100);
    debug!(raw = score, score = clamped, "Computed heuristic score.");
    clamped as u8
}

fn is_cloud_hosted(geo: &GeoRecord) -> bool {
    geo.operator
        .as_deref()
        .map(str::to_lowercase)
        .is_some_and(|operator| CLOUD_PROVIDER_TOKENS.iter().any(|token| operator.contains(token)))
}
