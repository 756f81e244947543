//! Data models for the authentication backend.
//!
//! Wire types mirror the JSON the backend speaks (camelCase where it does);
//! `LoginSuccess` and `UserInfo` are what the session client hands to callers.

pub mod auth;

pub use auth::{ErrorBody, LoginRequest, LoginResponse, LoginSuccess, UserInfo};
