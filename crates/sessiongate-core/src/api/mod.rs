//! REST API client module for the authentication backend.
//!
//! This module provides the `ApiClient` for the two backend routes the
//! session flow depends on: `POST /login`, which trades credentials for a
//! bearer token, and `GET /protected`, which accepts that token and returns
//! the signed-in user.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
