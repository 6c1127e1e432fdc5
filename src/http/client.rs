//! The authenticated HTTP client.
//!
//! Every request runs the same pipeline, composed at construction time:
//! attach credentials, send, and on failure hand the error to the refresh
//! coordinator (401s on non-auth endpoints) and the notifier (everything the
//! user should see). The refresh flow is described in [`super::refresh`].

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::ApiError;
use super::refresh::{RefreshGate, RefreshTicket};
use crate::config::ClientConfig;
use crate::endpoints;
use crate::models::{unwrap_data, TokenPair};
use crate::notify::{create_notifier, Notifier};
use crate::session::SessionHandle;
use crate::store::{create_token_store, TokenStore};

/// Header carrying the active school scope, for users administering more
/// than one school.
const SCHOOL_HEADER: &str = "X-School-Id";

/// One client instance per process is the expected shape: the token store,
/// session slot and refresh gate it owns are the process-wide singletons of
/// the design.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    store: Arc<dyn TokenStore>,
    session: SessionHandle,
    gate: RefreshGate,
    notifier: Arc<dyn Notifier>,
    active_school: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_in_ms),
            store,
            session: SessionHandle::new(),
            gate: RefreshGate::new(),
            notifier,
            active_school: RwLock::new(None),
        }
    }

    /// Build a client with the store and notifier the config implies.
    pub fn from_config(config: &ClientConfig) -> Self {
        ApiClient::new(config, create_token_store(&config.storage), create_notifier())
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Set or clear the school scope attached to subsequent requests.
    pub fn set_active_school(&self, school_id: Option<String>) {
        match self.active_school.write() {
            Ok(mut guard) => *guard = school_id,
            Err(poisoned) => *poisoned.into_inner() = school_id,
        }
    }

    fn active_school(&self) -> Option<String> {
        match self.active_school.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    // -- Typed surface

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.request(Method::GET, path, None).await?;
        unwrap_data(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let payload = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let body = self.request(Method::POST, path, Some(payload)).await?;
        unwrap_data(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let payload = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let body = self.request(Method::PUT, path, Some(payload)).await?;
        unwrap_data(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, path, None).await.map(|_| ())
    }

    /// POST where the caller does not care about the response payload.
    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let payload = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.request(Method::POST, path, Some(payload))
            .await
            .map(|_| ())
    }

    // -- Pipeline

    /// Run one logical request through the full pipeline. Returns the raw
    /// success JSON; the typed wrappers unwrap the envelope.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let token = self.store.access_token().await;
        match self.send_once(&method, path, body.as_ref(), token).await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.report(path, &err);
                if !err.is_unauthorized() || endpoints::is_auth_exempt(path) {
                    return Err(err);
                }

                // One retry per logical request: a 401 on the retried send
                // falls through below and never re-enters the refresh flow.
                let new_token = self.refresh_or_wait(err).await?;
                match self
                    .send_once(&method, path, body.as_ref(), Some(new_token))
                    .await
                {
                    Ok(value) => Ok(value),
                    Err(second) => {
                        self.report(path, &second);
                        Err(second)
                    }
                }
            }
        }
    }

    /// Build, authenticate and send a single request. No retries here.
    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token: Option<String>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url).timeout(self.timeout);

        // Absence of a token is not an error: the request goes out
        // unauthenticated and the server's verdict drives what happens next.
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }
        if let Some(school_id) = self.active_school() {
            request = request.header(SCHOOL_HEADER, school_id);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::from_reqwest)?;
        Self::into_body(response).await
    }

    async fn into_body(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await.map_err(ApiError::from_reqwest)?;
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            // An unreadable error body degrades to the per-status fallback.
            let bytes = response.bytes().await.unwrap_or_default();
            Err(ApiError::from_response(status, &bytes))
        }
    }

    /// Normalizer side effect: log the failure and surface it to the user
    /// when the gating rules say so. Never alters control flow.
    fn report(&self, path: &str, err: &ApiError) {
        debug!("Request to '{}' failed: {}", path, err);
        if err.should_notify(path) {
            self.notifier.notify(&err.to_string());
        }
    }

    /// Entry point of the refresh coordinator. `original` is the 401 that
    /// got us here; on terminal failure it is what the caller receives.
    async fn refresh_or_wait(&self, original: ApiError) -> Result<String, ApiError> {
        match self.gate.begin() {
            RefreshTicket::Waiter(rx) => {
                debug!("Refresh already in flight; queueing behind it");
                match rx.await {
                    Ok(outcome) => outcome,
                    // Leader dropped without settling (its caller was
                    // cancelled mid-cycle). Nothing to replay with.
                    Err(_) => Err(ApiError::SessionExpired),
                }
            }
            RefreshTicket::Leader => {
                let outcome = self.run_refresh().await;
                let shared = outcome
                    .as_ref()
                    .map(|pair| pair.access_token.clone())
                    .map_err(Clone::clone);
                // The cycle always closes here: flag reset and queue drained
                // whether the refresh succeeded or not.
                self.gate.settle(&shared);

                match outcome {
                    Ok(pair) => Ok(pair.access_token),
                    Err(refresh_err) => {
                        warn!("Token refresh failed ({}); ending session", refresh_err);
                        self.force_logout().await;
                        // The caller sees the 401 that started the cycle,
                        // not the refresh call's own error.
                        Err(original)
                    }
                }
            }
        }
    }

    /// Issue the one refresh call of a cycle and persist its result.
    async fn run_refresh(&self) -> Result<TokenPair, ApiError> {
        let refresh_token = self
            .store
            .refresh_token()
            .await
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::SessionExpired)?;

        let url = format!("{}{}", self.base_url, endpoints::AUTH_REFRESH_TOKEN);
        // Sent outside the pipeline: no bearer header, no interceptors, so a
        // failing refresh can never trigger another refresh.
        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let body = Self::into_body(response).await?;
        let pair: TokenPair = unwrap_data(body).map_err(|e| ApiError::Decode(e.to_string()))?;

        // Both tokens land together; a concurrent read never sees a mix.
        self.store.set_tokens(&pair).await;
        self.session.update_tokens(&pair);
        debug!("Token refresh succeeded");
        Ok(pair)
    }

    /// Terminal failure path: clear everything and raise the logout signal.
    pub(crate) async fn force_logout(&self) {
        self.store.clear().await;
        self.session.clear();
    }
}
