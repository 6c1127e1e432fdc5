use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::storage::StorageConfig;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ClientConfig),
}

/// Main config for v1.0.0: API endpoint, timeout, token storage, logging.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Fixed timeout applied to every network call, refresh included.
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_base_url() -> String {
    "http://localhost:5000/api/v1".to_string()
}

fn default_timeout_in_ms() -> u64 {
    30_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: default_base_url(),
            timeout_in_ms: default_timeout_in_ms(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Load config from a YAML file named "client.yaml" in the current directory,
/// with EDUPAY_-prefixed environment variables taking precedence.
pub fn load_config() -> Result<ClientConfig, figment::Error> {
    let figment = Figment::new()
        .merge(Yaml::file("./client.yaml"))
        .merge(Env::prefixed("EDUPAY_"));
    let config = figment.extract::<Config>()?;
    match config {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    println!(
        "{}",
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    );
}
