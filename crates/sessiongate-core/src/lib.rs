//! Core library for sessiongate.
//!
//! This crate provides everything needed to sign in to a bearer-token backend,
//! keep the issued token between runs and check it against a protected route:
//!
//! - `api`: HTTP client for the `/login` and `/protected` endpoints
//! - `auth`: credentials and the pluggable token stores
//! - `session`: the `SessionClient` and the events it emits
//! - `config`: user configuration and directory layout
//! - `models`: request/response payloads

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod session;

pub use api::{ApiClient, ApiError};
pub use auth::{
    Credentials, FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY,
};
pub use config::{Config, TokenStoreKind};
pub use error::AuthError;
pub use models::{LoginSuccess, UserInfo};
pub use session::{Redirect, SessionClient, SessionEvent, View};
