use std::sync::Mutex;

/// Session state kept by the client between calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredTokens {
    pub access: Option<String>,
    pub refresh: Option<String>,
    /// Cached from the last profile fetch; only used to decide what to show
    pub is_superuser: bool,
}

/// Persistence for the client's session state
pub trait TokenStore: Send + Sync {
    fn load(&self) -> StoredTokens;

    fn save(&self, tokens: StoredTokens);

    fn clear(&self) {
        self.save(StoredTokens::default());
    }
}

/// Process-local token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(StoredTokens {
                access: Some(access.into()),
                refresh: Some(refresh.into()),
                is_superuser: false,
            }),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> StoredTokens {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn save(&self, tokens: StoredTokens) {
        *self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip_and_clear() {
        let store = MemoryTokenStore::with_tokens("a", "r");
        assert_eq!(store.load().access.as_deref(), Some("a"));
        assert_eq!(store.load().refresh.as_deref(), Some("r"));

        store.clear();
        assert_eq!(store.load(), StoredTokens::default());
    }
}
