use thiserror::Error;

use crate::api::ApiError;

/// Banner shown when verification fails for any reason
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please login again.";

/// Fallback when the backend rejects a login without saying why
const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please try again.";

/// Fallback when the backend rejects a token without saying why
const VERIFY_FAILED_MESSAGE: &str = "Authentication failed";

const NETWORK_FAILURE_MESSAGE: &str = "Network error. Please check the backend URL.";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Rejected(String),

    #[error("No token received from server")]
    NoTokenReceived,

    #[error("Network error: {0}")]
    Network(String),

    #[error("No session token stored")]
    MissingToken,

    #[error("Token storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl AuthError {
    /// Map a failed `POST /login`
    pub fn from_login(err: ApiError) -> Self {
        Self::from_api(err, LOGIN_FAILED_MESSAGE)
    }

    /// Map a failed `GET /protected`
    pub fn from_verify(err: ApiError) -> Self {
        Self::from_api(err, VERIFY_FAILED_MESSAGE)
    }

    fn from_api(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Rejected { message, .. } => {
                AuthError::Rejected(message.unwrap_or_else(|| fallback.to_string()))
            }
            ApiError::NetworkError(e) => AuthError::Network(e.to_string()),
            // A 2xx we cannot read is a broken exchange, not a credential problem
            ApiError::InvalidResponse(detail) => AuthError::Network(detail),
        }
    }

    /// Text for the transient error banner
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Network(_) => NETWORK_FAILURE_MESSAGE.to_string(),
            AuthError::MissingToken => "Please login first.".to_string(),
            AuthError::Storage(_) => "Could not access saved session.".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_rejection_uses_backend_message_or_fallback() {
        let err = AuthError::from_login(ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid username or password"}"#,
        ));
        assert_eq!(err.user_message(), "Invalid username or password");

        let err = AuthError::from_login(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, ""));
        assert_eq!(err.user_message(), "Login failed. Please try again.");

        let err = AuthError::from_verify(ApiError::from_status(StatusCode::FORBIDDEN, ""));
        assert_eq!(err.to_string(), "Authentication failed");
    }

    #[test]
    fn test_no_token_message() {
        assert!(AuthError::NoTokenReceived
            .user_message()
            .starts_with("No token received"));
    }

    #[test]
    fn test_network_message_is_generic() {
        let err = AuthError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), "Network error. Please check the backend URL.");
        assert!(err.to_string().contains("connection refused"));
    }
}
