use std::fmt;

use crate::error::AuthError;

/// Message shown when either field is blank
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Please enter both username and password";

/// Username and password for a single login attempt.
/// Never persisted; dropped once the request has been sent.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Validate and build credentials.
    /// The username is trimmed; the password is kept exactly as typed but
    /// must contain something other than whitespace.
    pub fn new(username: &str, password: &str) -> Result<Self, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(AuthError::Validation(MISSING_CREDENTIALS_MESSAGE.to_string()));
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_rejected() {
        let cases = [
            ("", ""),
            ("", "pw"),
            ("alice", ""),
            ("   ", "pw"),
            ("alice", "  \t "),
            ("\n", "\t"),
        ];
        for (username, password) in cases {
            let err = Credentials::new(username, password).expect_err("blank field must fail");
            assert!(matches!(err, AuthError::Validation(_)), "{username:?}/{password:?}");
        }
    }

    #[test]
    fn test_username_trimmed_password_kept() {
        let creds = Credentials::new("  alice ", " pass word ").expect("valid");
        assert_eq!(creds.username(), "alice");
        assert_eq!(creds.password(), " pass word ");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2").expect("valid");
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
