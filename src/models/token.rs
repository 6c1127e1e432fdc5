use serde::{Deserialize, Serialize};

/// An access/refresh token pair as issued by login and refresh-token calls.
///
/// The pair is written and cleared as a unit; no caller ever holds a mix of
/// an old access token and a new refresh token.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        TokenPair {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}
