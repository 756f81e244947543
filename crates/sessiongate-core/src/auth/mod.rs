//! Authentication module for credentials and token storage.
//!
//! This module provides:
//! - `Credentials`: validated username/password for a single login
//! - `TokenStore`: the get/set/clear seam the session client writes through
//! - `MemoryTokenStore`, `FileTokenStore`, `KeyringTokenStore`: implementations
//!
//! Every store keeps exactly one value under `TOKEN_KEY`.

pub mod credentials;
pub mod file;
pub mod keyring;
pub mod store;

pub use credentials::Credentials;
pub use file::FileTokenStore;
pub use self::keyring::KeyringTokenStore;
pub use store::{MemoryTokenStore, TokenStore, TOKEN_KEY};
