use serde_json::Value;

use crate::error::StoreResult;

/// Key-value store of JSON documents.
///
/// Implementations keep only the latest document per key and never look
/// inside it. Every failure is returned, never swallowed.
pub trait DocumentStore {
    /// Read the document stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Store `document` under `key`, replacing any previous document.
    fn put(&self, key: &str, document: Value) -> StoreResult<()>;

    /// Remove the document under `key`. Returns `true` if one existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Check whether a document is stored under `key`.
    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Sorted list of keys starting with `prefix`.
    fn keys(&self, prefix: &str) -> StoreResult<Vec<String>>;
}
