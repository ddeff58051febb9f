use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};

use super::traits::StateStore;

/// Host-backed store: one JSON object in a file shared between agent
/// processes.
///
/// Every `load` re-reads the file and every `store` rewrites it through a
/// rename, so a write is observed by other processes on their next read
/// and a crash mid-write never leaves a torn file. The mutex serializes
/// writers within one process only; cross-process races are resolved by
/// the lease protocol, not here.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_entries(&self) -> Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("corrupt store file {}", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
        }
    }
}

impl StateStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());

        let raw = serde_json::to_string_pretty(&entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, raw).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}
