//! Key-value preference stores.
//!
//! Small per-account flags (such as the guided onboarding dismissal) live
//! behind [`PreferenceStore`] so the session logic does not care whether
//! they end up in memory, a JSON file, or a remote settings table.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{OnboardingError, OnboardingResult};

/// Synchronous string key-value store.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> OnboardingResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> OnboardingResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> OnboardingResult<()>;
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Arc<T> {
    fn get(&self, key: &str) -> OnboardingResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> OnboardingResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> OnboardingResult<()> {
        (**self).remove(key)
    }
}

fn poisoned() -> OnboardingError {
    OnboardingError::Store("preference store lock poisoned".to_string())
}

// ---------------------------------------------------------------------------
// MemoryPreferenceStore
// ---------------------------------------------------------------------------

/// In-process store. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> OnboardingResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> OnboardingResult<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> OnboardingResult<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonFilePreferenceStore
// ---------------------------------------------------------------------------

/// Write locks shared by every store instance in the process, keyed by the
/// resolved file path.
static FILE_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

/// Store backed by a single JSON object file.
///
/// Every write rewrites the whole file through a uniquely named temp file in
/// the same directory, then renames it into place. Read-modify-write cycles
/// are serialized per path across all instances, so separate stores opened
/// on the same file never drop each other's keys. A missing file reads as
/// empty.
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
}

impl JsonFilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Create the parent directory and return the lock for this file.
    fn write_lock(&self) -> OnboardingResult<Arc<Mutex<()>>> {
        let dir = self.parent_dir();
        std::fs::create_dir_all(dir)?;
        let key = match self.path.file_name() {
            Some(name) => dir.canonicalize()?.join(name),
            None => self.path.clone(),
        };

        let registry = FILE_LOCKS.get_or_init(Default::default);
        let mut locks = registry.lock().map_err(|_| poisoned())?;
        Ok(locks.entry(key).or_default().clone())
    }

    fn read_all(&self) -> OnboardingResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let bytes = std::fs::read(&self.path)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> OnboardingResult<()> {
        let json = serde_json::to_vec_pretty(entries)?;
        let mut tmp = tempfile::NamedTempFile::new_in(self.parent_dir())?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::debug!(path = %self.path.display(), entries = entries.len(), "Preferences flushed");
        Ok(())
    }

    /// Apply `change` to the stored map under the per-path lock. The file is
    /// rewritten only when `change` returns `true`.
    fn update(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> OnboardingResult<()> {
        let lock = self.write_lock()?;
        let _guard = lock.lock().map_err(|_| poisoned())?;
        let mut entries = self.read_all()?;
        if change(&mut entries) {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get(&self, key: &str) -> OnboardingResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> OnboardingResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> OnboardingResult<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePreferenceStore::new(dir.path().join("prefs.json"));
        assert_eq!(store.get("anything").unwrap(), None);
        store.remove("anything").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        JsonFilePreferenceStore::new(&path).set("a", "1").unwrap();
        JsonFilePreferenceStore::new(&path).set("b", "2").unwrap();

        let reopened = JsonFilePreferenceStore::new(&path);
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));

        let files: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(files, vec![std::ffi::OsString::from("prefs.json")]);
    }

    #[test]
    fn file_store_concurrent_instances_keep_every_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        for round in 0..25 {
            let handles: Vec<_> = (0..4)
                .map(|worker| {
                    let path = path.clone();
                    std::thread::spawn(move || {
                        let store = JsonFilePreferenceStore::new(path);
                        store.set(&format!("account:{round}:{worker}"), "dismissed")
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }
        }

        let store = JsonFilePreferenceStore::new(&path);
        for round in 0..25 {
            for worker in 0..4 {
                assert_eq!(
                    store.get(&format!("account:{round}:{worker}")).unwrap().as_deref(),
                    Some("dismissed"),
                    "lost account:{round}:{worker}"
                );
            }
        }
    }

    #[test]
    fn file_store_relative_and_absolute_paths_share_a_lock() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = JsonFilePreferenceStore::new(dir.path().join("prefs.json"));
        let dotted = JsonFilePreferenceStore::new(dir.path().join(".").join("prefs.json"));

        let a = absolute.write_lock().unwrap();
        let b = dotted.write_lock().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn file_store_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFilePreferenceStore::new(&path);
        assert_matches!(store.get("a"), Err(OnboardingError::Serialization(_)));
    }
}
