use reqwest::StatusCode;
use thiserror::Error;

use crate::endpoints;
use crate::models::api::first_field_message;
use crate::models::ErrorBody;

/// Why a request produced no response at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Connect,
    Timeout,
    Other,
}

/// Every failure a request can surface with. The `Display` form is the
/// normalized human-readable message; `Status` additionally keeps the raw
/// backend payload for callers that want field-level details.
///
/// Errors are `Clone` because one refresh outcome settles every request that
/// queued behind it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status {
        status: StatusCode,
        message: String,
        body: Option<ErrorBody>,
    },
    /// The request never produced a response.
    #[error("{message}")]
    Network {
        kind: NetworkErrorKind,
        message: String,
    },
    /// A body could not be encoded or decoded.
    #[error("Received an unexpected response from the server.")]
    Decode(String),
    /// Terminal refresh failure with no refresh token to try.
    #[error("Your session has expired. Please log in again.")]
    SessionExpired,
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Builds a `Status` error from a failed response, normalizing the
    /// message up front.
    pub(crate) fn from_response(status: StatusCode, body_bytes: &[u8]) -> ApiError {
        let body: Option<ErrorBody> = serde_json::from_slice(body_bytes).ok();
        let message = normalized_message(status, body.as_ref());
        ApiError::Status {
            status,
            message,
            body,
        }
    }

    /// Maps transport-level failures. Timeouts are network errors here, never
    /// authentication failures: they must not reach the refresh flow.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> ApiError {
        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }
        let kind = if err.is_timeout() {
            NetworkErrorKind::Timeout
        } else if err.is_connect() {
            NetworkErrorKind::Connect
        } else {
            NetworkErrorKind::Other
        };
        let message = match kind {
            NetworkErrorKind::Timeout => "Request timed out. Please try again.",
            NetworkErrorKind::Connect => {
                "Unable to connect to the server. Please check your internet connection."
            }
            NetworkErrorKind::Other => "Network error. Please check your connection.",
        };
        ApiError::Network {
            kind,
            message: message.to_string(),
        }
    }

    /// Whether the normalized message should be surfaced to the user.
    ///
    /// A 401 is either retried silently by the refresh flow or already ends
    /// the session, so it stays quiet; login is the exception because there a
    /// 401 means bad credentials, which the user must see.
    pub fn should_notify(&self, path: &str) -> bool {
        match self {
            ApiError::Status { status, .. } => {
                *status != StatusCode::UNAUTHORIZED || endpoints::is_login(path)
            }
            ApiError::Network { .. } | ApiError::Decode(_) => true,
            ApiError::SessionExpired => false,
        }
    }
}

/// Produce one human-readable message for a failed response. Precedence:
/// field-validation map, then top-level message, then per-status fallback.
fn normalized_message(status: StatusCode, body: Option<&ErrorBody>) -> String {
    if let Some(body) = body {
        if let Some(map) = &body.validation_errors {
            if let Some(message) = first_field_message(map) {
                return message;
            }
        }
        if let Some(message) = body.message.as_deref().filter(|m| !m.is_empty()) {
            return message.to_string();
        }
    }
    status_fallback(status, body)
}

fn status_fallback(status: StatusCode, body: Option<&ErrorBody>) -> String {
    let detail = body.and_then(|b| b.detail.clone());
    let title = body.and_then(|b| b.title.clone());

    match status.as_u16() {
        400 => {
            if let Some(map) = body.and_then(|b| b.errors.as_ref()) {
                if let Some(message) = first_field_message(map) {
                    return message;
                }
            }
            detail
                .or(title)
                .unwrap_or_else(|| "Invalid request. Please check your input.".to_string())
        }
        401 => detail.unwrap_or_else(|| {
            "Invalid credentials. Please check your email and password.".to_string()
        }),
        403 => detail.unwrap_or_else(|| {
            "You do not have permission to perform this action.".to_string()
        }),
        404 => detail.unwrap_or_else(|| "The requested resource was not found.".to_string()),
        409 => detail.or(title).unwrap_or_else(|| {
            "A conflict occurred. The resource may already exist.".to_string()
        }),
        422 => detail.unwrap_or_else(|| "Validation failed. Please check your input.".to_string()),
        500 => "An internal server error occurred. Please try again later.".to_string(),
        502 | 503 | 504 => "The server is temporarily unavailable. Please try again later.".to_string(),
        _ => detail
            .or(title)
            .unwrap_or_else(|| "An unexpected error occurred. Please try again.".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16, body: &str) -> ApiError {
        ApiError::from_response(
            StatusCode::from_u16(status).expect("valid status"),
            body.as_bytes(),
        )
    }

    /// The validation map wins over a top-level message when both are present.
    #[test]
    fn test_validation_map_beats_message() {
        let err = status_error(
            400,
            r#"{"validationErrors": {"email": ["Email is required"]}, "message": "Bad request"}"#,
        );
        assert_eq!(err.to_string(), "Email is required");
    }

    #[test]
    fn test_message_beats_status_fallback() {
        let err = status_error(409, r#"{"message": "School name already taken"}"#);
        assert_eq!(err.to_string(), "School name already taken");
    }

    #[test]
    fn test_status_fallback_sentences() {
        assert_eq!(
            status_error(403, "{}").to_string(),
            "You do not have permission to perform this action."
        );
        assert_eq!(
            status_error(500, "{}").to_string(),
            "An internal server error occurred. Please try again later."
        );
        assert_eq!(
            status_error(503, "{}").to_string(),
            "The server is temporarily unavailable. Please try again later."
        );
    }

    #[test]
    fn test_400_consults_errors_map() {
        let err = status_error(400, r#"{"errors": {"name": ["Name is required"]}}"#);
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn test_detail_and_title_fallbacks() {
        let err = status_error(404, r#"{"detail": "No such school"}"#);
        assert_eq!(err.to_string(), "No such school");

        let err = status_error(418, r#"{"title": "Teapot"}"#);
        assert_eq!(err.to_string(), "Teapot");

        let err = status_error(418, "{}");
        assert_eq!(
            err.to_string(),
            "An unexpected error occurred. Please try again."
        );
    }

    #[test]
    fn test_unparseable_body_uses_status_fallback() {
        let err = status_error(401, "<html>gateway</html>");
        assert_eq!(
            err.to_string(),
            "Invalid credentials. Please check your email and password."
        );
    }

    /// 401s stay quiet everywhere except the login endpoint.
    #[test]
    fn test_notify_gating() {
        let unauthorized = status_error(401, "{}");
        assert!(!unauthorized.should_notify("/Users"));
        assert!(!unauthorized.should_notify(crate::endpoints::AUTH_ME));
        assert!(unauthorized.should_notify(crate::endpoints::AUTH_LOGIN));

        let forbidden = status_error(403, "{}");
        assert!(forbidden.should_notify("/Users"));

        assert!(!ApiError::SessionExpired.should_notify("/Users"));
    }
}
