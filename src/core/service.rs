// src/core/service.rs

use crate::config::Config;
use crate::core::auth::{Authorizer, DenyAllAuthorizer, TokenFileAuthorizer};
use crate::core::error::ScanError;
use crate::core::models::{ScanRecord, ScanRequest};
use crate::core::scanner::ScanOrchestrator;
use crate::core::store::{JsonlScanStore, ScanStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Transport-agnostic entry point: one request in, one record or error out.
#[derive(Clone)]
pub struct ScanService {
    orchestrator: ScanOrchestrator,
    authorizer: Arc<dyn Authorizer>,
    store: Arc<dyn ScanStore>,
    pending_writes: Arc<Mutex<JoinSet<()>>>,
}

impl ScanService {
    pub fn new(orchestrator: ScanOrchestrator, authorizer: Arc<dyn Authorizer>, store: Arc<dyn ScanStore>) -> Self {
        Self {
            orchestrator,
            authorizer,
            store,
            pending_writes: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ScanError> {
        let authorizer: Arc<dyn Authorizer> = match &config.tokens_file {
            Some(path) => Arc::new(TokenFileAuthorizer::new(path)),
            None => Arc::new(DenyAllAuthorizer),
        };
        info!(
            threat_enrichment = config.threat_enabled(),
            deep_profile = config.tokens_file.is_some(),
            "Scan service configured."
        );

        Ok(Self::new(
            ScanOrchestrator::from_config(config)?,
            authorizer,
            Arc::new(JsonlScanStore::new(&config.history_file)),
        ))
    }

    pub async fn handle(&self, request: ScanRequest) -> Result<ScanRecord, ScanError> {
        let ScanRequest { target, kind, profile, authorization_token } = request;
        let authorizer = Arc::clone(&self.authorizer);

        let result = self
            .orchestrator
            .run(&target, kind, profile, move || async move {
                match authorization_token.as_deref() {
                    Some(token) => authorizer.is_authorized(token).await,
                    None => false,
                }
            })
            .await;

        match &result {
            Ok(record) => {
                let store = Arc::clone(&self.store);
                let record = record.clone();
                let mut pending = self.pending_writes.lock().await;
                while pending.try_join_next().is_some() {}
                pending.spawn(async move {
                    store.append(&record).await;
                });
            }
            Err(e) if e.is_client_error() => warn!(%target, error = %e, "Scan request rejected."),
            Err(e) => error!(%target, error = %e, "Scan request failed."),
        }

        result
    }

    /// Waits for store appends that are still in flight. Callers about to
    /// exit use this; the scan responses themselves never wait on the store.
    pub async fn flush(&self) {
        let mut pending = self.pending_writes.lock().await;
        while pending.join_next().await.is_some() {}
    }
}
