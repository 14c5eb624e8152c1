//! Dirty-state tracking for host models.
//!
//! A host model declares its fields through [`Model`] and is wrapped in a
//! [`Tracked`]. From then on the tracker knows whether the instance has ever
//! been persisted and which fields changed since the last persistence point,
//! whether they were reassigned through [`Tracked::set`] or mutated in place
//! through one of the tracked containers.
//!
//! # Key Types
//!
//! - [`Tracked`] -- the tracker: state queries, assignment, save
//! - [`Field`] -- typed descriptor of one declared field, built with [`field!`]
//! - [`ChangeHooks`] / [`HookFns`] -- `onchange` veto and `onchanged` observer
//! - [`Persister`] -- the host's persistence action
//! - [`GuardedSave`] -- save guard around an arbitrary persistence callable
//! - [`TrackerConfig`] -- original-value capture and logging switches
//!
//! # Example
//!
//! ```
//! use dirtrack_tracker::{field, Binder, Field, Model, Tracked, TrackedVec};
//!
//! #[derive(serde::Serialize)]
//! struct Post {
//!     tags: TrackedVec<i64>,
//! }
//!
//! impl Post {
//!     const TAGS: Field<Post, TrackedVec<i64>> = field!(Post, tags);
//! }
//!
//! impl Model for Post {
//!     const FIELDS: &'static [&'static str] = &["tags"];
//!     fn attach(&mut self, binder: &Binder) {
//!         dirtrack_tracker::Attach::attach(&mut self.tags, &binder.bind("tags"));
//!     }
//! }
//!
//! let mut post = Tracked::load(Post { tags: vec![1].into() });
//! assert!(!post.is_dirty());
//!
//! post.container(&Post::TAGS).push(2);
//! assert!(post.is_field_dirty("tags"));
//! assert_eq!(post.tags, vec![1, 2]);
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod guarded;
pub mod hooks;
pub mod model;
pub mod persist;
pub mod tracked;

pub use config::TrackerConfig;
pub use diff::{diff_fields, ChangeReport, FieldChange, FieldSnapshot};
pub use error::{TrackError, TrackResult};
pub use guarded::{guarded, GuardedSave};
pub use hooks::{ChangeHooks, HookFns};
pub use model::{Field, FieldValue, Model};
pub use persist::{Persister, SaveOutcome};
pub use tracked::{Assignment, ContainerMut, Tracked, TrackedBuilder};

pub use dirtrack_containers::{
    Attach, Binder, Binding, TrackedContainer, TrackedMap, TrackedSet, TrackedVec,
};
pub use dirtrack_types::{DirtyRecord, FieldName, HookError, Lifecycle, PersistError};
