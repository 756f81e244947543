use anyhow::{Context, Result};
use ::keyring::Entry;

use super::store::{TokenStore, TOKEN_KEY};

const SERVICE_NAME: &str = "sessiongate";

/// Token store backed by the OS keychain.
/// The token is the secret of the `sessiongate` / `auth_token` entry.
///
/// macOS uses the Keychain, Windows the Credential Manager and Linux the
/// kernel keyutils session keyring, which is shared by every process in the
/// login session and emptied on logout.
pub struct KeyringTokenStore {
    entry: Entry,
}

impl KeyringTokenStore {
    pub fn new() -> Result<Self> {
        Self::for_service(SERVICE_NAME)
    }

    /// Use a different keychain service name (e.g. one per backend)
    pub fn for_service(service: &str) -> Result<Self> {
        let entry = Entry::new(service, TOKEN_KEY).context("Failed to create keyring entry")?;
        Ok(Self { entry })
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> Result<Option<String>> {
        match self.entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(::keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn set(&mut self, token: &str) -> Result<()> {
        self.entry
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn clear(&mut self) -> Result<()> {
        match self.entry.delete_credential() {
            Ok(()) | Err(::keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

#[cfg(test)]
#[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
mod tests {
    use super::*;

    #[test]
    fn test_keychain_token_visible_to_second_instance() {
        let service = format!("sessiongate-test-{}", std::process::id());
        let mut writer = KeyringTokenStore::for_service(&service).unwrap();
        if let Err(e) = writer.set("tok-shared") {
            // Sandboxes without a reachable keychain (e.g. keyctl blocked)
            eprintln!("skipping, keychain unavailable: {:#}", e);
            return;
        }

        let mut reader = KeyringTokenStore::for_service(&service).unwrap();
        let read_back = reader.get();
        reader.clear().unwrap();

        assert_eq!(read_back.unwrap().as_deref(), Some("tok-shared"));
        assert_eq!(writer.get().unwrap(), None);
        reader.clear().unwrap();
    }
}
