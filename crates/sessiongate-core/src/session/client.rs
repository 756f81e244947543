use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::auth::{Credentials, TokenStore};
use crate::config::Config;
use crate::error::{AuthError, SESSION_EXPIRED_MESSAGE};
use crate::models::{LoginSuccess, UserInfo};

use super::events::{Redirect, SessionEvent, View};

/// Performs login, verification and logout against the backend, persisting
/// the token through `S`.
///
/// Every operation takes `&mut self`, so a single client never has two
/// requests in flight.
pub struct SessionClient<S: TokenStore = Box<dyn TokenStore>> {
    api: ApiClient,
    store: S,
    events: mpsc::Sender<SessionEvent>,
    login_redirect_delay: Duration,
    expired_redirect_delay: Duration,
}

impl SessionClient<Box<dyn TokenStore>> {
    /// Build a client with the API, store and delays described by `config`
    pub fn from_config(config: &Config, events: mpsc::Sender<SessionEvent>) -> anyhow::Result<Self> {
        Ok(SessionClient::new(config.api_client()?, config.token_store()?, events)
            .with_delays(config.login_redirect_delay(), config.expired_redirect_delay()))
    }
}

impl<S: TokenStore> SessionClient<S> {
    pub fn new(api: ApiClient, store: S, events: mpsc::Sender<SessionEvent>) -> Self {
        let defaults = Config::default();
        Self {
            api,
            store,
            events,
            login_redirect_delay: defaults.login_redirect_delay(),
            expired_redirect_delay: defaults.expired_redirect_delay(),
        }
    }

    /// Override the delays before navigating after login and after a failed verification
    pub fn with_delays(mut self, login_redirect: Duration, expired_redirect: Duration) -> Self {
        self.login_redirect_delay = login_redirect;
        self.expired_redirect_delay = expired_redirect;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Check if a token is stored (the only local notion of "logged in")
    pub fn is_logged_in(&self) -> bool {
        self.store.has_token()
    }

    /// Helper to send events, logging if nobody is listening
    async fn emit(&self, event: SessionEvent) {
        if let Err(e) = self.events.send(event).await {
            debug!(error = %e, "Session event dropped - receiver closed");
        }
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Exchange credentials for a token and store it.
    ///
    /// On success a redirect to the dashboard is emitted after the login
    /// delay. On failure an error banner is emitted and the caller may retry
    /// straight away.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<LoginSuccess, AuthError> {
        let credentials = match Credentials::new(username, password) {
            Ok(credentials) => credentials,
            Err(e) => {
                self.emit(SessionEvent::Error(e.user_message())).await;
                return Err(e);
            }
        };

        self.emit(SessionEvent::Loading(true)).await;
        let result = self.login_with(&credentials).await;
        self.emit(SessionEvent::Loading(false)).await;

        match result {
            Ok(success) => {
                info!(
                    username = %success.username,
                    expires_in = ?success.expires_in,
                    "Login successful, token stored"
                );
                self.emit(SessionEvent::LoggedIn(success.clone())).await;
                self.emit(SessionEvent::Redirect(Redirect::after(
                    View::Dashboard,
                    self.login_redirect_delay,
                )))
                .await;
                Ok(success)
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.emit(SessionEvent::Error(e.user_message())).await;
                Err(e)
            }
        }
    }

    async fn login_with(&mut self, credentials: &Credentials) -> Result<LoginSuccess, AuthError> {
        let response = self
            .api
            .login(credentials)
            .await
            .map_err(AuthError::from_login)?;

        let token = response.usable_token().ok_or(AuthError::NoTokenReceived)?;
        self.store.set(token)?;

        Ok(LoginSuccess {
            username: response
                .username
                .clone()
                .unwrap_or_else(|| credentials.username().to_string()),
            expires_in: response.expires_in_secs(),
            issued_at: Utc::now(),
        })
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Check the stored token against the protected endpoint.
    ///
    /// Returns `Ok(None)` after emitting an immediate redirect to the login
    /// view when no token is stored; no request is made. When the backend
    /// rejects the token or cannot be reached, the token is deleted, the
    /// expiry banner is shown and a delayed redirect to login is emitted.
    pub async fn verify(&mut self) -> Result<Option<UserInfo>, AuthError> {
        let token = match self.store.get() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No token found, redirecting to login");
                self.emit(SessionEvent::Redirect(Redirect::now(View::Login))).await;
                return Ok(None);
            }
            Err(e) => return Err(self.fail_verification(e.into()).await),
        };

        self.emit(SessionEvent::Loading(true)).await;
        let result = self.api.protected(&token).await.map_err(AuthError::from_verify);
        self.emit(SessionEvent::Loading(false)).await;

        match result {
            Ok(user) => {
                info!(username = %user.display_name(), "Authentication verified");
                self.emit(SessionEvent::UserLoaded(user.clone())).await;
                Ok(Some(user))
            }
            Err(e) => Err(self.fail_verification(e).await),
        }
    }

    async fn fail_verification(&mut self, err: AuthError) -> AuthError {
        warn!(error = %err, "Token verification failed, clearing stored token");
        if let Err(e) = self.store.clear() {
            error!(error = %e, "Failed to clear stored token");
        }
        self.emit(SessionEvent::Error(SESSION_EXPIRED_MESSAGE.to_string())).await;
        self.emit(SessionEvent::Redirect(Redirect::after(
            View::Login,
            self.expired_redirect_delay,
        )))
        .await;
        err
    }

    // =========================================================================
    // Logout
    // =========================================================================

    /// Delete the stored token and go back to the login view.
    ///
    /// Purely local: the backend is not told, so the token stays valid there
    /// until it expires. The redirect is emitted even if the store fails.
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        let result = self.store.clear();
        match &result {
            Ok(()) => info!("User logged out"),
            Err(e) => error!(error = %e, "Failed to clear token on logout"),
        }
        self.emit(SessionEvent::LoggedOut).await;
        self.emit(SessionEvent::Redirect(Redirect::now(View::Login))).await;
        result.map_err(AuthError::from)
    }
}

// ============================================================================
// Tests
// ============================================================================
