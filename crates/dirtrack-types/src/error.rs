use std::error::Error as StdError;

use thiserror::Error;

/// Errors produced by record bookkeeping.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// Failure raised by an `onchange` or `onchanged` hook.
///
/// A hook failure is never a veto: vetoes are expressed by `onchange`
/// returning `Ok(false)`. An `Err` travels back to whoever assigned the field.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl HookError {
    /// Create a hook error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a hook error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure raised by a persistence action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistError {
    /// The storage backend failed (I/O, connection, poisoned lock, ...).
    #[error("backend error: {0}")]
    Backend(String),

    /// The requested record does not exist in the backend.
    #[error("record not found: {key}")]
    NotFound { key: String },

    /// The model could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The backend refused the write.
    #[error("write rejected: {reason}")]
    Rejected { reason: String },
}
