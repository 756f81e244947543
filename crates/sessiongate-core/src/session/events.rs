use std::time::Duration;

use crate::models::{LoginSuccess, UserInfo};

/// Screens a presentation layer can navigate between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
}

/// Request to navigate to `to` once `after` has elapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub to: View,
    pub after: Duration,
}

impl Redirect {
    pub fn now(to: View) -> Self {
        Self {
            to,
            after: Duration::ZERO,
        }
    }

    pub fn after(to: View, after: Duration) -> Self {
        Self { to, after }
    }

    pub fn is_immediate(&self) -> bool {
        self.after.is_zero()
    }
}

/// Outcomes emitted by the session client.
///
/// These are the only way the client affects presentation: a front end
/// drains them and updates its banners, fields and current view.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A request started (`true`) or finished (`false`)
    Loading(bool),
    /// Message for the transient error banner
    Error(String),
    /// Token issued and stored
    LoggedIn(LoginSuccess),
    /// Token accepted by the protected endpoint
    UserLoaded(UserInfo),
    /// Token removed by an explicit logout
    LoggedOut,
    Redirect(Redirect),
}
