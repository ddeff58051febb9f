use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;

use super::traits::StateStore;

/// Process-local backend. Used when no shared path is configured and as
/// the degraded fallback; coordination degenerates to a single agent that
/// always wins its own claims.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl StateStore for InMemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
