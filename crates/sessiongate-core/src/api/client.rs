//! API client for the authentication backend.
//!
//! This module provides the `ApiClient` struct for exchanging credentials for
//! a bearer token and presenting that token to the protected route.

use std::time::Duration;

use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::Credentials;
use crate::models::{LoginRequest, LoginResponse, UserInfo};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default backend location
pub const DEFAULT_API_BASE_URL: &str = "https://auth-security-backend-production.up.railway.app";

/// HTTP request timeout in seconds.
/// Without it a hung backend would leave the login form disabled forever.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const LOGIN_PATH: &str = "/login";
const PROTECTED_PATH: &str = "/protected";

/// API client for the authentication backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for `base_url` with an explicit request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send credentials to `POST /login`
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let url = self.url(LOGIN_PATH);
        debug!(url = %url, username = credentials.username(), "Sending login request");

        let body = LoginRequest {
            username: credentials.username(),
            password: credentials.password(),
        };

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        Self::read_json(Self::check_response(response).await?).await
    }

    /// Present a bearer token to `GET /protected`
    pub async fn protected(&self, token: &str) -> Result<UserInfo, ApiError> {
        let url = self.url(PROTECTED_PATH);
        debug!(url = %url, "Verifying token against protected endpoint");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(token)
            .send()
            .await?;

        Self::read_json(Self::check_response(response).await?).await
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        // Treat an empty 2xx body as an empty object so optional fields default
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| {
            ApiError::InvalidResponse(format!("{} in {}", e, ApiError::truncate_body(text)))
        })
    }
}
