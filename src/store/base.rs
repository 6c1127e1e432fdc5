use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::file_store::FileTokenStore;
use super::memory_store::MemoryTokenStore;
use crate::config::{StorageBackend, StorageConfig};
use crate::models::TokenPair;

/// The TokenStore trait abstracts where the access/refresh token pair lives.
///
/// Accessors never fail: a backend that cannot read simply reports no token
/// (the server rejects the unauthenticated request, which is the signal the
/// rest of the pipeline acts on). `set_tokens` persists both tokens in one
/// step so no reader ever sees a mixed old/new pair.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn access_token(&self) -> Option<String>;
    async fn refresh_token(&self) -> Option<String>;
    async fn set_tokens(&self, pair: &TokenPair);
    async fn clear(&self);
}

/// Creates a concrete token store based on the StorageConfig.
/// If `storage.enabled = false`, tokens are held in memory only.
pub fn create_token_store(config: &StorageConfig) -> Arc<dyn TokenStore> {
    if !config.enabled {
        info!("Token persistence is disabled. Using in-memory store.");
        return Arc::new(MemoryTokenStore::new());
    }

    match &config.backend {
        Some(StorageBackend::File(file_config)) => {
            info!("Using file token store at '{}'.", file_config.path);
            Arc::new(FileTokenStore::new(&file_config.path))
        }
        None => {
            info!("Storage is enabled but no backend is configured; tokens stay in memory.");
            Arc::new(MemoryTokenStore::new())
        }
    }
}
