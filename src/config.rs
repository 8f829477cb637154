// src/config.rs

use crate::logging::{get_data_dir, PROJECT_NAME};
use lazy_static::lazy_static;
use std::path::PathBuf;
use std::time::Duration;

lazy_static! {
    pub static ref THREAT_KEY_ENV: String = format!("{}_THREAT_API_KEY", PROJECT_NAME.clone());
    pub static ref TOKENS_FILE_ENV: String = format!("{}_TOKENS_FILE", PROJECT_NAME.clone());
    pub static ref HISTORY_FILE_ENV: String = format!("{}_HISTORY_FILE", PROJECT_NAME.clone());
    pub static ref RDAP_URL_ENV: String = format!("{}_RDAP_URL", PROJECT_NAME.clone());
    pub static ref GEO_URL_ENV: String = format!("{}_GEO_URL", PROJECT_NAME.clone());
    pub static ref THREAT_URL_ENV: String = format!("{}_THREAT_URL", PROJECT_NAME.clone());
    pub static ref WHOIS_SERVER_ENV: String = format!("{}_WHOIS_SERVER", PROJECT_NAME.clone());
}

pub const DEFAULT_RDAP_URL: &str = "https://rdap.org";
pub const DEFAULT_GEO_URL: &str = "http://ip-api.com";
pub const DEFAULT_THREAT_URL: &str = "https://api.shodan.io";
pub const DEFAULT_WHOIS_SERVER: &str = "whois.iana.org";
pub const HISTORY_FILE: &str = "scan-history.jsonl";
pub const USER_AGENT: &str = "VanguardRecon/0.1";

/// Runtime configuration, resolved once at startup.
///
/// Optional credentials switch features on by their presence alone; a
/// missing or blank value disables the feature without an error.
#[derive(Debug, Clone)]
pub struct Config {
    pub threat_api_key: Option<String>,
    pub tokens_file: Option<PathBuf>,
    pub history_file: PathBuf,
    pub rdap_base_url: String,
    pub geo_base_url: String,
    pub threat_base_url: String,
    pub whois_server: String,
    pub http_timeout: Duration,
    pub dns_timeout: Duration,
    pub port_timeout: Duration,
    pub port_concurrency: usize,
    pub deep_port_count: usize,
    pub request_deadline: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threat_api_key: None,
            tokens_file: None,
            history_file: get_data_dir().join(HISTORY_FILE),
            rdap_base_url: DEFAULT_RDAP_URL.to_string(),
            geo_base_url: DEFAULT_GEO_URL.to_string(),
            threat_base_url: DEFAULT_THREAT_URL.to_string(),
            whois_server: DEFAULT_WHOIS_SERVER.to_string(),
            http_timeout: Duration::from_secs(8),
            dns_timeout: Duration::from_secs(5),
            port_timeout: Duration::from_millis(1000),
            port_concurrency: 8,
            deep_port_count: 10,
            request_deadline: Duration::from_secs(20),
        }
    }
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();
        Self {
            threat_api_key: get(&THREAT_KEY_ENV),
            tokens_file: get(&TOKENS_FILE_ENV).map(PathBuf::from),
            history_file: get(&HISTORY_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.history_file),
            rdap_base_url: get(&RDAP_URL_ENV).unwrap_or(defaults.rdap_base_url),
            geo_base_url: get(&GEO_URL_ENV).unwrap_or(defaults.geo_base_url),
            threat_base_url: get(&THREAT_URL_ENV).unwrap_or(defaults.threat_base_url),
            whois_server: get(&WHOIS_SERVER_ENV).unwrap_or(defaults.whois_server),
            ..defaults
        }
    }

    pub fn threat_enabled(&self) -> bool {
        self.threat_api_key.is_some()
    }
}
