//! Typed wrappers for the /Auth endpoints, plus the session side effects
//! (persisting tokens on login, clearing them on logout) that belong to the
//! client rather than the caller.

use serde::{Deserialize, Serialize};

use crate::endpoints;
use crate::http::{ApiClient, ApiError};
use crate::models::{TokenPair, User};

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordData {
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub access_token_expires_at: Option<String>,
    #[serde(default)]
    pub refresh_token_expires_at: Option<String>,
    pub user: User,
}

impl ApiClient {
    /// Authenticate with email/password. On success the token pair is
    /// persisted and the session established before the response is handed
    /// back.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError> {
        let response: LoginResponse = self.post(endpoints::AUTH_LOGIN, credentials).await?;
        let pair = TokenPair::new(&response.access_token, &response.refresh_token);
        self.store().set_tokens(&pair).await;
        self.session().establish(response.user.clone(), pair);
        Ok(response)
    }

    pub async fn register(&self, data: &RegisterData) -> Result<(), ApiError> {
        self.post_unit(endpoints::AUTH_REGISTER, data).await
    }

    /// Fetch the current account through the authenticated pipeline.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get(endpoints::AUTH_ME).await
    }

    /// Rebuild the session from persisted tokens, the startup path of a
    /// returning user. Returns false (and stays logged out) when no token
    /// pair is on disk.
    pub async fn restore_session(&self) -> Result<bool, ApiError> {
        if self.store().refresh_token().await.is_none()
            && self.store().access_token().await.is_none()
        {
            return Ok(false);
        }

        let user = self.me().await?;
        // Re-read the store after the call: me() may have refreshed the pair
        // mid-flight, and the session must carry the pair that won.
        let (Some(access), Some(refresh)) = (
            self.store().access_token().await,
            self.store().refresh_token().await,
        ) else {
            return Ok(false);
        };
        self.session()
            .establish(user, TokenPair::new(access, refresh));
        Ok(true)
    }

    pub async fn change_password(&self, data: &ChangePasswordData) -> Result<(), ApiError> {
        self.post_unit(endpoints::AUTH_CHANGE_PASSWORD, data).await
    }

    /// Client-side logout: drop tokens and session. The backend keeps no
    /// session state to tear down.
    pub async fn logout(&self) {
        self.force_logout().await;
    }
}
