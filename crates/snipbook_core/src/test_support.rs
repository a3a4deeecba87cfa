//! Shared test-only helpers for snipbook_core.

use crate::models::snippet::SnippetRecord;
use crate::store::{SnippetStore, StoredSnippet};
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

/// Process-wide lock serializing environment mutation across test threads.
pub(crate) fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Restores an environment variable value on drop.
pub(crate) struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &str, value: &str) -> Self {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self {
            key: key.to_string(),
            previous,
        }
    }

    pub(crate) fn remove(key: &str) -> Self {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.previous.as_deref() {
            Some(previous) => std::env::set_var(&self.key, previous),
            None => std::env::remove_var(&self.key),
        }
    }
}

/// Creates an isolated snippet store inside a temporary directory.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
///
/// # Panics
/// Panics if temp-dir creation or store initialization fails.
pub(crate) fn setup_temp_store() -> (SnippetStore, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let store = SnippetStore::open(temp_dir.path().join("data")).expect("store");
    (store, temp_dir)
}

/// Writes a record under `file_name` and returns the stored handle.
pub(crate) fn write_snippet(
    store: &SnippetStore,
    file_name: &str,
    record: SnippetRecord,
) -> StoredSnippet {
    let path = store.dir().join(file_name);
    store.write(&path, &record).expect("write snippet");
    StoredSnippet { path, record }
}
