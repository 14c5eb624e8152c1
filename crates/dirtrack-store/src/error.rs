use dirtrack_tracker::TrackError;
use dirtrack_types::PersistError;

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document is stored under the key.
    #[error("document not found: {0}")]
    NotFound(String),

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store's lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// The store does not accept writes.
    #[error("store is read-only")]
    ReadOnly,

    /// Building the tracker for a loaded document failed.
    #[error(transparent)]
    Track(#[from] TrackError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for PersistError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => PersistError::NotFound { key },
            StoreError::Serialization(err) => PersistError::Serialization(err.to_string()),
            StoreError::ReadOnly => PersistError::Rejected {
                reason: "store is read-only".into(),
            },
            other => PersistError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_maps_to_rejected() {
        let err = PersistError::from(StoreError::ReadOnly);
        assert_eq!(
            err,
            PersistError::Rejected {
                reason: "store is read-only".into()
            }
        );
    }

    #[test]
    fn not_found_keeps_key() {
        let err = PersistError::from(StoreError::NotFound("post:1".into()));
        assert_eq!(err, PersistError::NotFound { key: "post:1".into() });
    }

    #[test]
    fn poisoned_lock_is_a_backend_failure() {
        let err = PersistError::from(StoreError::LockPoisoned("boom".into()));
        assert!(matches!(err, PersistError::Backend(msg) if msg.contains("boom")));
    }
}
