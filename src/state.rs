//! Shared request state

use std::sync::Arc;

use crate::auth::IdentityVerifier;
use crate::config::{AppConfig, StorageBackend};
use crate::database::{DatabaseManager, MemorySipStore, PgSipStore, SipStore};

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Bearer token verifier built from the signing secret
    pub verifier: Arc<IdentityVerifier>,
    /// Plan persistence
    pub store: Arc<dyn SipStore>,
    /// API version
    pub version: String,
}

impl AppState {
    pub fn new(verifier: IdentityVerifier, store: Arc<dyn SipStore>) -> Self {
        Self {
            verifier: Arc::new(verifier),
            store,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Build the verifier and open the configured store.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let verifier = IdentityVerifier::from_config(&config.security)?;

        let store: Arc<dyn SipStore> = match config.database.backend {
            StorageBackend::Postgres => {
                let pool = DatabaseManager::connect(&config.database).await?;
                DatabaseManager::ensure_schema(&pool).await?;
                Arc::new(PgSipStore::new(pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory SIP store; records are lost on restart");
                Arc::new(MemorySipStore::new())
            }
        };

        Ok(Self::new(verifier, store))
    }
}
