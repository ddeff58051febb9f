use std::sync::Arc;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Store keys shared by every agent. Values are JSON strings.
pub mod keys {
    pub const DRIVER_LEASE: &str = "lease.driver";
    pub const SURFACE_LEASE: &str = "lease.surface";
    pub const SCHEDULE: &str = "schedule.state";
    pub const HISTORY: &str = "content.history";
    pub const DIAGNOSTICS: &str = "diag.enabled";
}

/// Raw persistent key/value backend shared between agent processes.
///
/// Reads and writes from the same process are immediately consistent;
/// other processes observe a write only on their next `load`. There is no
/// compare-and-swap and no change notification, which is why the lease
/// protocol built on top must tolerate stale reads and racing writers.
pub trait StateStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn store(&self, key: &str, value: &str) -> Result<()>;
}

/// Typed, failure-absorbing view over a [`StateStore`].
///
/// A backend failure never propagates: `get_or` falls back to the
/// caller-supplied default and `put` becomes a no-op, so agents keep
/// running in a degraded mode when the store is unreachable. Every caller
/// must treat a read as possibly stale or defaulted.
#[derive(Clone)]
pub struct StoreHandle {
    backend: Arc<dyn StateStore>,
}

impl StoreHandle {
    pub fn new(backend: Arc<dyn StateStore>) -> Self {
        Self { backend }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.backend.load(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("malformed value under {}: {}; using default", key, e);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                log::warn!("store read failed for {}: {}; using default", key, e);
                default
            }
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("failed to serialize value for {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.backend.store(key, &raw) {
            log::warn!("store write failed for {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct UnreachableStore;

    impl StateStore for UnreachableStore {
        fn load(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("storage unavailable"))
        }

        fn store(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("storage unavailable"))
        }
    }

    #[test]
    fn test_get_or_falls_back_on_backend_failure() {
        let handle = StoreHandle::new(Arc::new(UnreachableStore));
        let value: u32 = handle.get_or("schedule.state", 7);
        assert_eq!(value, 7);
    }

    #[test]
    fn test_put_is_a_no_op_on_backend_failure() {
        let handle = StoreHandle::new(Arc::new(UnreachableStore));
        handle.put("schedule.state", &42u32);
    }

    #[test]
    fn test_get_or_falls_back_on_malformed_value() {
        let memory = Arc::new(crate::storage::InMemoryStore::new());
        memory.store("schedule.state", "not json").unwrap();
        let handle = StoreHandle::new(memory);
        let value: u32 = handle.get_or("schedule.state", 3);
        assert_eq!(value, 3);
    }
}
