//! In-memory document store for tests and ephemeral use.
//!
//! [`InMemoryDocumentStore`] keeps every document in a `HashMap` behind a
//! shared `RwLock`. Clones share the same data, so a collection, its
//! persisters and the test that inspects them all see the same writes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

/// An in-memory implementation of [`DocumentStore`].
///
/// Data is lost when the last clone is dropped.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<String, Value>>>,
    writes: Arc<AtomicU64>,
    read_only: bool,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            writes: Arc::new(AtomicU64::new(0)),
            read_only: false,
        }
    }

    /// A handle to the same data that rejects every write.
    pub fn read_only(&self) -> Self {
        Self {
            read_only: true,
            ..self.clone()
        }
    }

    /// Returns `true` if this handle rejects writes.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_lock()?.len())
    }

    /// Returns `true` if the store holds no documents.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read_lock()?.is_empty())
    }

    /// Number of successful `put` calls across every handle.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Remove every document.
    pub fn clear(&self) -> StoreResult<()> {
        self.check_writable()?;
        self.write_lock()?.clear();
        Ok(())
    }

    fn read_lock(
        &self,
    ) -> StoreResult<std::sync::RwLockReadGuard<'_, HashMap<String, Value>>> {
        self.documents
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write_lock(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Value>>> {
        self.documents
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.read_only {
            warn!("write rejected: store handle is read-only");
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.read_lock()?.get(key).cloned())
    }

    fn put(&self, key: &str, document: Value) -> StoreResult<()> {
        self.check_writable()?;
        self.write_lock()?.insert(key.to_string(), document);
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(key, "document written");
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        self.check_writable()?;
        Ok(self.write_lock()?.remove(key).is_some())
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .read_lock()?
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.documents.read().map(|map| map.len()).unwrap_or(0);
        f.debug_struct("InMemoryDocumentStore")
            .field("document_count", &count)
            .field("write_count", &self.write_count())
            .field("read_only", &self.read_only)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn put_and_get() {
        let store = InMemoryDocumentStore::new();
        store.put("post:1", json!({"title": "a"})).unwrap();
        assert_eq!(store.get("post:1").unwrap(), Some(json!({"title": "a"})));
        assert!(store.contains("post:1").unwrap());
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = InMemoryDocumentStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
        assert!(!store.contains("nope").unwrap());
    }

    #[test]
    fn put_replaces_previous_document() {
        let store = InMemoryDocumentStore::new();
        store.put("k", json!(1)).unwrap();
        store.put("k", json!(2)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(2)));
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn delete_present_and_missing() {
        let store = InMemoryDocumentStore::new();
        store.put("k", json!(1)).unwrap();
        assert!(store.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn keys_are_filtered_and_sorted() {
        let store = InMemoryDocumentStore::new();
        for key in ["post:2", "user:1", "post:1"] {
            store.put(key, json!(null)).unwrap();
        }
        assert_eq!(store.keys("post:").unwrap(), vec!["post:1", "post:2"]);
        assert_eq!(store.keys("").unwrap().len(), 3);
    }

    #[test]
    fn clones_share_data() {
        let store = InMemoryDocumentStore::new();
        let other = store.clone();
        other.put("k", json!(true)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(true)));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn read_only_handle_rejects_writes() {
        let store = InMemoryDocumentStore::new();
        store.put("k", json!(1)).unwrap();
        let frozen = store.read_only();

        assert!(matches!(frozen.put("k", json!(2)), Err(StoreError::ReadOnly)));
        assert!(matches!(frozen.delete("k"), Err(StoreError::ReadOnly)));
        assert!(matches!(frozen.clear(), Err(StoreError::ReadOnly)));
        assert_eq!(frozen.get("k").unwrap(), Some(json!(1)));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryDocumentStore::default();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryDocumentStore"));
        assert!(debug.contains("document_count: 0"));
    }
}
