//! Foundation types for dirtrack.
//!
//! This crate provides the per-instance bookkeeping shared by every other
//! dirtrack crate: the [`DirtyRecord`] that answers "is this object new?" and
//! "which fields changed since the last persistence point?", the
//! [`Lifecycle`] state machine it moves through, and the error types that
//! cross crate boundaries.
//!
//! # Key Types
//!
//! - [`DirtyRecord`] -- `is_new` flag plus the set of dirty field names
//! - [`Lifecycle`] -- Created / Modified / Loaded / Destroyed
//! - [`FieldName`] -- declared field identifier
//! - [`HookError`] -- failure raised by a change hook
//! - [`PersistError`] -- failure raised by a persistence action

pub mod error;
pub mod lifecycle;
pub mod record;

pub use error::{HookError, PersistError, TypeError};
pub use lifecycle::Lifecycle;
pub use record::DirtyRecord;

/// Name of a declared field on a tracked model.
///
/// Field names are declared statically by the host model, so a borrowed
/// `'static` string is enough to identify one.
pub type FieldName = &'static str;
