use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A wrapper for the token-storage configuration:
/// - enabled: if false, tokens live only in memory for the process lifetime.
/// - backend: the actual persistence backend (file, etc.).
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct StorageConfig {
    pub enabled: bool,
    #[serde(flatten)]
    pub backend: Option<StorageBackend>,
}

/// The existing storage backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StorageBackend {
    #[serde(rename = "file")]
    File(FileStorageConfig),
    // Add more variants here as needed, like:
    // #[serde(rename = "keyring")]
    // Keyring(KeyringStorageConfig),
}

/// Config for the file-backed token store.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FileStorageConfig {
    /// Path of the JSON document holding the two token keys.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            enabled: false,
            backend: None,
        }
    }
}
