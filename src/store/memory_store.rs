use std::sync::RwLock;

use async_trait::async_trait;

use super::base::TokenStore;
use crate::models::TokenPair;

/// Process-local token store. The default when persistence is disabled, and
/// what the tests use.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        MemoryTokenStore::default()
    }

    /// Convenience for tests and hosts restoring a known session.
    pub fn with_tokens(pair: TokenPair) -> Self {
        MemoryTokenStore {
            tokens: RwLock::new(Some(pair)),
        }
    }

    fn read(&self) -> Option<TokenPair> {
        match self.tokens.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn access_token(&self) -> Option<String> {
        self.read().map(|pair| pair.access_token)
    }

    async fn refresh_token(&self) -> Option<String> {
        self.read().map(|pair| pair.refresh_token)
    }

    async fn set_tokens(&self, pair: &TokenPair) {
        match self.tokens.write() {
            Ok(mut guard) => *guard = Some(pair.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(pair.clone()),
        }
    }

    async fn clear(&self) {
        match self.tokens.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Both tokens come and go together; a set followed by reads never mixes pairs.
    #[tokio::test]
    async fn test_set_and_clear_pair() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.access_token().await, None);
        assert_eq!(store.refresh_token().await, None);

        store.set_tokens(&TokenPair::new("a1", "r1")).await;
        assert_eq!(store.access_token().await.as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("r1"));

        store.set_tokens(&TokenPair::new("a2", "r2")).await;
        assert_eq!(store.access_token().await.as_deref(), Some("a2"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("r2"));

        store.clear().await;
        assert_eq!(store.access_token().await, None);
        assert_eq!(store.refresh_token().await, None);
    }
}
