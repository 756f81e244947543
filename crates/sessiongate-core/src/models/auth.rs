use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /login`
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful `POST /login` payload.
/// Every field is optional on the wire; a missing token is reported by the
/// session client rather than failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "expiresIn", default)]
    pub expires_in: Option<Value>,
}

impl LoginResponse {
    /// Token lifetime in seconds, when the backend sent a non-negative number
    pub fn expires_in_secs(&self) -> Option<u64> {
        match self.expires_in.as_ref()? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            _ => None,
        }
    }

    /// The token, if present and non-empty
    pub fn usable_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Error payload the backend attaches to non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of a successful login, kept for display only.
/// The backend stays the authority on expiry; nothing here is enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub username: String,
    pub expires_in: Option<u64>,
    pub issued_at: DateTime<Utc>,
}

impl LoginSuccess {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        Duration::try_seconds(secs).and_then(|d| self.issued_at.checked_add_signed(d))
    }

    /// Get minutes remaining until the backend-reported expiry (for display)
    pub fn minutes_until_expiry(&self) -> Option<i64> {
        self.expires_at()
            .map(|at| (at - Utc::now()).num_minutes().max(0))
    }
}

/// User returned by `GET /protected`.
/// `username` is kept as raw JSON; the backend does not promise a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: Option<Value>,
    /// Any other fields the backend includes
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserInfo {
    /// Username as text, or "User" when it is missing, null, empty or false
    pub fn display_name(&self) -> String {
        match self.username.as_ref() {
            None | Some(Value::Null) | Some(Value::Bool(false)) => "User".to_string(),
            Some(Value::String(s)) if s.is_empty() => "User".to_string(),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => "User".to_string(),
            Some(value) => value_text(value),
        }
    }

    pub fn status_text(&self) -> String {
        format!("Welcome back, {}!", self.display_name())
    }

    /// Token state shown next to a verified user
    pub fn token_status(&self) -> &'static str {
        "Valid"
    }

    /// Extra fields rendered as `key: value` pairs, sorted by key
    pub fn extra_fields(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), value_text(v)))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        fields
    }
}

/// Strings render bare, everything else as JSON
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
