use std::sync::{Arc, Mutex};

use edupay_client::config::ClientConfig;
use edupay_client::http::ApiClient;
use edupay_client::models::TokenPair;
use edupay_client::notify::Notifier;
use edupay_client::store::{MemoryTokenStore, TokenStore};

/// Notifier that records every surfaced message, standing in for the UI
/// toast layer.
#[derive(Default)]
pub struct CapturingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CapturingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(CapturingNotifier::default())
    }

    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for CapturingNotifier {
    fn notify(&self, message: &str) {
        if let Ok(mut guard) = self.messages.lock() {
            guard.push(message.to_string());
        }
    }
}

/// Build a client against a mock server, optionally pre-seeded with a token
/// pair, plus the notifier capturing what the user would have seen.
pub fn build_client(base_url: &str, tokens: Option<TokenPair>) -> (ApiClient, Arc<CapturingNotifier>) {
    let store: Arc<dyn TokenStore> = match tokens {
        Some(pair) => Arc::new(MemoryTokenStore::with_tokens(pair)),
        None => Arc::new(MemoryTokenStore::new()),
    };
    let notifier = CapturingNotifier::new();
    let config = ClientConfig {
        base_url: base_url.to_string(),
        ..ClientConfig::default()
    };
    let client = ApiClient::new(&config, store, notifier.clone());
    (client, notifier)
}
