// src/core/target.rs

use crate::core::models::{ScanTarget, TargetKind};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static RE_IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)$")
        .unwrap()
});
static RE_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$").unwrap()
});

/// Pattern-based classification: dotted-quad first, then label.label...tld.
pub fn classify(raw: &str) -> TargetKind {
    let candidate = raw.trim();
    if RE_IPV4.is_match(candidate) {
        TargetKind::Ip
    } else if RE_DOMAIN.is_match(candidate) {
        TargetKind::Domain
    } else {
        TargetKind::Unclassified
    }
}

impl ScanTarget {
    /// An explicit kind always wins over pattern matching.
    pub fn new(raw: &str, explicit_kind: Option<TargetKind>) -> Self {
        let raw = raw.trim().to_string();
        let kind = explicit_kind.unwrap_or_else(|| classify(&raw));
        Self { raw, kind }
    }
}

/// Turns whatever the user typed (a URL, `host:port`, a bare name) into the
/// host part, leaving free text untouched.
pub fn host_from_input(input: &str) -> String {
    let trimmed = input.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    Url::parse(&with_scheme)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.trim_end_matches('.').to_string()))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| trimmed.to_string())
}
