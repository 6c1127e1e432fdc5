use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::error;

use super::base::TokenStore;
use crate::models::TokenPair;

// Storage keys carried over from the web client so the two artifacts can
// share a token document during the migration.
const ACCESS_TOKEN_KEY: &str = "edupay_access_token";
const REFRESH_TOKEN_KEY: &str = "edupay_refresh_token";

/// Token store backed by a small JSON document on disk, holding the two token
/// keys. All reads and writes go through one mutex so the pair is written
/// atomically with respect to every other accessor in the process.
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileTokenStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(path: &PathBuf) -> Value {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                error!("Token file at '{}' is not valid JSON: {}", path.display(), e);
                json!({})
            }),
            // A missing file just means no session yet.
            Err(_) => json!({}),
        }
    }

    fn save(path: &PathBuf, document: &Value) {
        let serialized = match serde_json::to_string_pretty(document) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to serialize token document: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(path, serialized) {
            error!("Failed to write token file '{}': {}", path.display(), e);
        }
    }

    fn with_path<T>(&self, f: impl FnOnce(&PathBuf) -> T) -> T {
        let _guard = match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&self.path)
    }

    fn read_key(&self, key: &str) -> Option<String> {
        self.with_path(|path| {
            Self::load(path)
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn access_token(&self) -> Option<String> {
        self.read_key(ACCESS_TOKEN_KEY)
    }

    async fn refresh_token(&self) -> Option<String> {
        self.read_key(REFRESH_TOKEN_KEY)
    }

    async fn set_tokens(&self, pair: &TokenPair) {
        self.with_path(|path| {
            let mut document = Self::load(path);
            document[ACCESS_TOKEN_KEY] = Value::from(pair.access_token.clone());
            document[REFRESH_TOKEN_KEY] = Value::from(pair.refresh_token.clone());
            Self::save(path, &document);
        });
    }

    async fn clear(&self) {
        self.with_path(|path| {
            let mut document = Self::load(path);
            if let Some(object) = document.as_object_mut() {
                object.remove(ACCESS_TOKEN_KEY);
                object.remove(REFRESH_TOKEN_KEY);
            }
            Self::save(path, &document);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in_tempdir() -> (tempfile::TempDir, FileTokenStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileTokenStore::new(dir.path().join("tokens.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_no_tokens() {
        let (_dir, store) = store_in_tempdir();
        assert_eq!(store.access_token().await, None);
        assert_eq!(store.refresh_token().await, None);
    }

    #[tokio::test]
    async fn test_pair_roundtrip_under_distinct_keys() {
        let (dir, store) = store_in_tempdir();
        store.set_tokens(&TokenPair::new("a1", "r1")).await;

        assert_eq!(store.access_token().await.as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("r1"));

        // The on-disk document uses the two storage keys, nothing else.
        let raw = std::fs::read_to_string(dir.path().join("tokens.json")).expect("token file");
        let document: Value = serde_json::from_str(&raw).expect("valid JSON");
        assert_eq!(document["edupay_access_token"], "a1");
        assert_eq!(document["edupay_refresh_token"], "r1");

        store.clear().await;
        assert_eq!(store.access_token().await, None);
        assert_eq!(store.refresh_token().await, None);
    }

    /// Unrelated keys in the document survive token writes and clears.
    #[tokio::test]
    async fn test_clear_preserves_foreign_keys() {
        let (dir, store) = store_in_tempdir();
        std::fs::write(
            dir.path().join("tokens.json"),
            r#"{"edupay_ui": {"theme": "dark"}}"#,
        )
        .expect("seed file");

        store.set_tokens(&TokenPair::new("a1", "r1")).await;
        store.clear().await;

        let raw = std::fs::read_to_string(dir.path().join("tokens.json")).expect("token file");
        let document: Value = serde_json::from_str(&raw).expect("valid JSON");
        assert!(document.get("edupay_access_token").is_none());
        assert_eq!(document["edupay_ui"]["theme"], "dark");
    }
}
