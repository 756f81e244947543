//! Application state management for sessiongate.
//!
//! This module contains the `App` struct: the presentation side of the
//! session flow. It owns the login form, the dashboard fields and the
//! banners, queues session operations and applies the `SessionEvent`s the
//! core emits (including delayed navigation).

use std::time::{Duration, Instant};

use anyhow::Result;
use sessiongate_core::{
    Config, LoginSuccess, Redirect, SessionClient, SessionEvent, TokenStore, UserInfo, View,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::utils::mask_token;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the session event channel.
/// One operation emits at most five events.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Environment variables that prefill the login form
const USERNAME_ENV: &str = "SESSIONGATE_USERNAME";
const PASSWORD_ENV: &str = "SESSIONGATE_PASSWORD";

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Session operation waiting to run on the next loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Login,
    Verify,
    Logout,
}

/// Transient error banner
#[derive(Debug, Clone)]
pub struct Banner {
    pub message: String,
    pub shown_at: Instant,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    /// Write `last_username` back to the config file after a login
    persist_config: bool,
    session: SessionClient,
    events_rx: mpsc::Receiver<SessionEvent>,

    // UI State
    pub state: AppState,
    pub view: View,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,

    // Dashboard state
    pub user: Option<UserInfo>,
    pub login_info: Option<LoginSuccess>,
    pub token_preview: Option<String>,

    // Request/banners
    pub busy: bool,
    pub loading: bool,
    pub banner: Option<Banner>,
    pending_action: Option<PendingAction>,
    pending_redirect: Option<(View, Instant)>,
}

impl App {
    /// Create a new application instance from configuration
    pub fn new(config: Config) -> Result<Self> {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let session = SessionClient::from_config(&config, tx)?;
        debug!(api = %config.api_base_url, store = ?config.token_store, "Session client ready");
        let mut app = Self::with_session(config, session, rx);
        app.persist_config = true;
        Ok(app)
    }

    /// Create an application around an existing session client
    pub fn with_session(
        config: Config,
        session: SessionClient,
        events_rx: mpsc::Receiver<SessionEvent>,
    ) -> Self {
        let login_username = std::env::var(USERNAME_ENV)
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_password = std::env::var(PASSWORD_ENV).unwrap_or_default();

        Self {
            config,
            persist_config: false,
            session,
            events_rx,
            state: AppState::Normal,
            view: View::Login,
            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            user: None,
            login_info: None,
            token_preview: None,
            busy: false,
            loading: false,
            banner: None,
            pending_action: None,
            pending_redirect: None,
        }
    }

    /// Pick the first view: the dashboard (which verifies) if a token exists
    pub fn start(&mut self) {
        if self.session.is_logged_in() {
            self.navigate(View::Dashboard);
        } else {
            self.navigate(View::Login);
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigate(&mut self, view: View) {
        debug!(?view, "Navigating");
        self.view = view;
        self.pending_redirect = None;
        self.banner = None;
        self.busy = false;
        self.loading = false;

        match view {
            View::Dashboard => {
                self.refresh_token_preview();
                self.queue(PendingAction::Verify);
            }
            View::Login => {
                self.user = None;
                self.login_info = None;
                self.token_preview = None;
                self.pending_action = None;
                self.login_focus = if self.login_username.is_empty() {
                    LoginFocus::Username
                } else {
                    LoginFocus::Password
                };
            }
        }
    }

    fn refresh_token_preview(&mut self) {
        self.token_preview = match self.session.store().get() {
            Ok(token) => token.map(|t| mask_token(&t)),
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        };
    }

    /// Check if new operations may be started
    pub fn can_submit(&self) -> bool {
        !self.busy && self.pending_redirect.is_none()
    }

    // =========================================================================
    // Session operations
    // =========================================================================

    fn queue(&mut self, action: PendingAction) {
        self.busy = true;
        self.pending_action = Some(action);
    }

    /// Queue a login with the form contents; ignored while a request is in flight
    pub fn submit_login(&mut self) {
        if !self.can_submit() {
            debug!("Submit ignored - request in flight");
            return;
        }
        self.banner = None;
        self.queue(PendingAction::Login);
    }

    pub fn request_verify(&mut self) {
        if self.can_submit() {
            self.queue(PendingAction::Verify);
        }
    }

    pub fn request_logout(&mut self) {
        if !self.busy {
            self.queue(PendingAction::Logout);
        }
    }

    pub fn has_pending_action(&self) -> bool {
        self.pending_action.is_some()
    }

    /// Run the queued operation, if any, then apply what it emitted
    pub async fn run_pending(&mut self) {
        let Some(action) = self.pending_action.take() else {
            return;
        };

        match action {
            PendingAction::Login => {
                let username = self.login_username.clone();
                let password = self.login_password.clone();
                if let Err(e) = self.session.authenticate(&username, &password).await {
                    debug!(error = %e, "Login attempt failed");
                }
            }
            PendingAction::Verify => {
                if let Err(e) = self.session.verify().await {
                    debug!(error = %e, "Verification failed");
                }
            }
            PendingAction::Logout => {
                if let Err(e) = self.session.logout().await {
                    warn!(error = %e, "Logout could not clear the stored token");
                }
            }
        }

        self.busy = false;
        self.check_session_events();
    }

    /// Apply all session events received so far
    pub fn check_session_events(&mut self) {
        let mut events = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            events.push(event);
        }
        for event in events {
            self.process_session_event(event);
        }
    }

    fn process_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Loading(loading) => self.loading = loading,
            SessionEvent::Error(message) => {
                self.banner = Some(Banner {
                    message,
                    shown_at: Instant::now(),
                });
            }
            SessionEvent::LoggedIn(success) => {
                self.login_password.clear();
                self.remember_username(&success.username);
                self.login_info = Some(success);
            }
            SessionEvent::UserLoaded(user) => {
                self.user = Some(user);
            }
            SessionEvent::LoggedOut => {
                self.user = None;
                self.login_info = None;
                self.token_preview = None;
            }
            SessionEvent::Redirect(redirect) => self.schedule(redirect),
        }
    }

    fn schedule(&mut self, redirect: Redirect) {
        if redirect.is_immediate() {
            self.navigate(redirect.to);
        } else {
            self.pending_redirect = Some((redirect.to, Instant::now() + redirect.after));
        }
    }

    fn remember_username(&mut self, username: &str) {
        if self.config.last_username.as_deref() == Some(username) {
            return;
        }
        self.config.last_username = Some(username.to_string());
        if !self.persist_config {
            return;
        }
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Perform due navigation and dismiss stale banners
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        if let Some((view, at)) = self.pending_redirect {
            if now >= at {
                info!(?view, "Delayed navigation");
                self.navigate(view);
            }
        }

        let dismiss_after: Duration = self.config.banner_dismiss();
        if let Some(ref banner) = self.banner {
            if now.saturating_duration_since(banner.shown_at) >= dismiss_after {
                self.banner = None;
            }
        }
    }

    pub fn pending_redirect(&self) -> Option<View> {
        self.pending_redirect.map(|(view, _)| view)
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sessiongate_core::{ApiClient, MemoryTokenStore};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_app(server: &MockServer, store: MemoryTokenStore, delay_ms: u64) -> App {
        let config = Config {
            api_base_url: server.uri(),
            login_redirect_delay_ms: delay_ms,
            expired_redirect_delay_ms: delay_ms,
            ..Config::default()
        };
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let api = ApiClient::new(&config.api_base_url, config.request_timeout()).unwrap();
        let session = SessionClient::new(api, Box::new(store) as Box<dyn TokenStore>, tx)
            .with_delays(config.login_redirect_delay(), config.expired_redirect_delay());
        let mut app = App::with_session(config, session, rx);
        app.login_username.clear();
        app.login_password.clear();
        app
    }

    async fn mount_protected_ok(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/protected"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "alice"})))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_start_without_token_shows_login() {
        let server = MockServer::start().await;
        let mut app = test_app(&server, MemoryTokenStore::new(), 0);
        app.start();
        assert_eq!(app.view, View::Login);
        assert!(!app.has_pending_action());
    }

    #[tokio::test]
    async fn test_start_with_token_verifies_on_dashboard() {
        let server = MockServer::start().await;
        mount_protected_ok(&server).await;
        let mut app = test_app(&server, MemoryTokenStore::with_token("tok-1234567890abc"), 0);

        app.start();
        assert_eq!(app.view, View::Dashboard);
        assert!(app.busy);

        app.run_pending().await;
        let user = app.user.as_ref().expect("user loaded");
        assert_eq!(user.status_text(), "Welcome back, alice!");
        assert_eq!(app.token_preview.as_deref(), Some("tok-12…0abc"));
        assert!(!app.busy);
    }

    #[tokio::test]
    async fn test_login_flow_reaches_dashboard_after_delay() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok", "username": "alice", "expiresIn": 3600
            })))
            .mount(&server)
            .await;
        mount_protected_ok(&server).await;
        let mut app = test_app(&server, MemoryTokenStore::new(), 500);
        app.start();

        app.login_username = "alice".to_string();
        app.login_password = "pw".to_string();
        app.submit_login();
        app.run_pending().await;

        assert_eq!(app.view, View::Login);
        assert_eq!(app.pending_redirect(), Some(View::Dashboard));
        assert!(app.login_password.is_empty());
        assert!(!app.can_submit());

        app.tick_at(Instant::now() + Duration::from_millis(600));
        assert_eq!(app.view, View::Dashboard);

        app.run_pending().await;
        assert!(app.user.is_some());
    }

    #[tokio::test]
    async fn test_blank_submit_shows_banner_and_stays_on_login() {
        let server = MockServer::start().await;
        let mut app = test_app(&server, MemoryTokenStore::new(), 0);
        app.start();

        app.submit_login();
        app.run_pending().await;

        assert_eq!(app.view, View::Login);
        let banner = app.banner.as_ref().expect("banner shown");
        assert_eq!(banner.message, "Please enter both username and password");
        assert!(app.can_submit());
    }

    #[tokio::test]
    async fn test_submit_ignored_while_busy() {
        let server = MockServer::start().await;
        let mut app = test_app(&server, MemoryTokenStore::new(), 0);
        app.start();

        app.submit_login();
        assert!(app.busy);
        app.request_verify();
        assert_eq!(app.pending_action, Some(PendingAction::Login));
    }

    #[tokio::test]
    async fn test_expired_token_returns_to_login_after_delay() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/protected"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let mut app = test_app(&server, MemoryTokenStore::with_token("stale"), 2000);
        app.start();
        app.run_pending().await;

        assert_eq!(app.view, View::Dashboard);
        assert_eq!(
            app.banner.as_ref().map(|b| b.message.as_str()),
            Some("Your session has expired. Please login again.")
        );
        assert_eq!(app.pending_redirect(), Some(View::Login));

        app.tick_at(Instant::now() + Duration::from_millis(1000));
        assert_eq!(app.view, View::Dashboard);

        app.tick_at(Instant::now() + Duration::from_millis(2100));
        assert_eq!(app.view, View::Login);
        assert!(app.user.is_none());
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let server = MockServer::start().await;
        mount_protected_ok(&server).await;
        let mut app = test_app(&server, MemoryTokenStore::with_token("tok"), 0);
        app.start();
        app.run_pending().await;

        app.request_logout();
        app.run_pending().await;
        assert_eq!(app.view, View::Login);
        assert!(app.user.is_none());

        // Logging out again lands in the same place
        app.request_logout();
        app.run_pending().await;
        assert_eq!(app.view, View::Login);
    }

    #[tokio::test]
    async fn test_banner_auto_dismisses() {
        let server = MockServer::start().await;
        let mut app = test_app(&server, MemoryTokenStore::new(), 0);
        app.banner = Some(Banner {
            message: "oops".to_string(),
            shown_at: Instant::now(),
        });

        app.tick_at(Instant::now() + Duration::from_millis(4000));
        assert!(app.banner.is_some());
        app.tick_at(Instant::now() + Duration::from_millis(5100));
        assert!(app.banner.is_none());
    }

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\x00'));
        assert!(!can_add_username_char(0, '\n'));
        assert!(!can_add_username_char(0, '\t'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }
}
