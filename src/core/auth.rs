// src/core/auth.rs

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Gate for the deep profile. Implementations must not keep the set of valid
/// tokens in process memory: several instances may share one token store.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn is_authorized(&self, token: &str) -> bool;
}

/// Used when no authorization backend is configured.
pub struct DenyAllAuthorizer;

#[async_trait]
impl Authorizer for DenyAllAuthorizer {
    async fn is_authorized(&self, _token: &str) -> bool {
        debug!("No authorization backend configured; denying.");
        false
    }
}

/// Checks tokens against a shared file, one token per line (`#` comments
/// allowed). The file is re-read on every check, so tokens granted by
/// another process are visible immediately.
pub struct TokenFileAuthorizer {
    path: PathBuf,
}

impl TokenFileAuthorizer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Authorizer for TokenFileAuthorizer {
    async fn is_authorized(&self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }

        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents
                .lines()
                .map(|line| line.split('#').next().unwrap_or("").trim())
                .any(|candidate| !candidate.is_empty() && candidate == token),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read the token store.");
                false
            }
        }
    }
}
