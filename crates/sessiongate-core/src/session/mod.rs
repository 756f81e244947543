//! Session flow: log in, verify, log out.
//!
//! `SessionClient` owns the API client and a `TokenStore`, performs each
//! operation as a single request and reports what the user should see as
//! `SessionEvent`s on a tokio channel. It never touches presentation state.

pub mod client;
pub mod events;

pub use client::SessionClient;
pub use events::{Redirect, SessionEvent, View};
