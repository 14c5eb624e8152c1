use dirtrack_types::{HookError, PersistError, TypeError};
use thiserror::Error;

/// Errors from tracker operations.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The field is not declared on the model.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A save had work to do but nothing was configured to persist the model.
    #[error("save requested but no persistence action is configured")]
    NoPersistence,

    /// An `onchange` or `onchanged` hook failed. Passed through untouched.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// The persistence action failed; tracker state was left as it was.
    #[error("persistence failed: {0}")]
    Persist(#[from] PersistError),

    /// A field value could not be serialized for a hook or snapshot.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Original-value capture is turned off in the tracker config.
    #[error("original-value capture is disabled")]
    SnapshotDisabled,
}

impl From<TypeError> for TrackError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnknownField(name) => Self::UnknownField(name),
        }
    }
}

/// Result alias for tracker operations.
pub type TrackResult<T> = Result<T, TrackError>;
