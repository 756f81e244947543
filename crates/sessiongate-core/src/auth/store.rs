use anyhow::Result;

/// Key the session token is stored under, whatever the backend
pub const TOKEN_KEY: &str = "auth_token";

/// Persistent home of the single session token.
///
/// Implementations hold at most one token; `set` replaces any previous value
/// and `clear` on an empty store succeeds.
pub trait TokenStore: Send {
    fn get(&self) -> Result<Option<String>>;
    fn set(&mut self, token: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;

    /// Check if a token is currently stored
    fn has_token(&self) -> bool {
        matches!(self.get(), Ok(Some(_)))
    }
}

impl TokenStore for Box<dyn TokenStore> {
    fn get(&self) -> Result<Option<String>> {
        (**self).get()
    }

    fn set(&mut self, token: &str) -> Result<()> {
        (**self).set(token)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }
}

/// Token store that lives only as long as the process
#[derive(Debug, Default, Clone)]
pub struct MemoryTokenStore {
    token: Option<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }

    fn set(&mut self, token: &str) -> Result<()> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.token = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_replaces() {
        let mut store = MemoryTokenStore::new();
        assert!(!store.has_token());

        store.set("first").unwrap();
        store.set("second").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("second"));

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn TokenStore> = Box::new(MemoryTokenStore::with_token("tok"));
        assert!(store.has_token());
        store.clear().unwrap();
        assert!(!store.has_token());
    }
}
