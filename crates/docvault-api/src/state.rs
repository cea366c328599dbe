//! Application state shared by all handlers.

use std::sync::Arc;
use std::time::Duration;

use docvault_core::Config;
use docvault_db::DocumentRepository;
use docvault_processing::ExtractionOrchestrator;
use docvault_storage::Storage;

use crate::auth::JwtVerifier;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub documents: Arc<dyn DocumentRepository>,
    pub extraction: ExtractionOrchestrator,
    pub jwt: Arc<JwtVerifier>,
}

impl AppState {
    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        documents: Arc<dyn DocumentRepository>,
    ) -> Self {
        let jwt = Arc::new(JwtVerifier::new(config.jwt_secret(), config.jwt_audience()));
        Self {
            config,
            storage,
            documents,
            extraction: ExtractionOrchestrator::new(),
            jwt,
        }
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.config.extraction_timeout_secs())
    }
}
