pub mod json_backend;

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{errors::LedgerError, ledger::Ledger};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Key/value persistence collaborator that stores whole ledger snapshots.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, key: &str, ledger: &Ledger) -> Result<()>;
    fn load(&self, key: &str) -> Result<Ledger>;
    fn keys(&self) -> Result<Vec<String>>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Keeps snapshots in process memory. Useful for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<BTreeMap<String, Ledger>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Ledger>>> {
        self.entries
            .lock()
            .map_err(|_| LedgerError::Storage("snapshot map poisoned".into()))
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, key: &str, ledger: &Ledger) -> Result<()> {
        self.entries()?.insert(key.to_string(), ledger.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Ledger> {
        self.entries()?
            .get(key)
            .cloned()
            .ok_or_else(|| LedgerError::Storage(format!("snapshot `{}` not found", key)))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.keys().cloned().collect())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

pub use json_backend::JsonSnapshotStore;
