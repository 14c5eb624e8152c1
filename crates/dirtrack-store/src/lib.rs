//! Document storage for tracked dirtrack models.
//!
//! Models are stored as JSON documents under string keys. A
//! [`Collection`] ties a [`DocumentStore`] to a key prefix and hands out
//! trackers wired to save back into it, so the full new / dirty / clean
//! lifecycle can be exercised against real reads and writes.
//!
//! # Key Types
//!
//! - [`DocumentStore`] -- key-value store of JSON documents
//! - [`InMemoryDocumentStore`] -- `HashMap`-based store for tests and embedding
//! - [`Collection`] -- prefix-scoped view that tracks and loads models
//! - [`StorePersister`] -- [`Persister`](dirtrack_tracker::Persister) writing to a store
//! - [`Keyed`] -- how a model names its own document
//!
//! # Design Rules
//!
//! 1. The store never interprets documents; it only keeps the latest write.
//! 2. A rejected or failed write leaves the stored document untouched.
//! 3. Loaded models start clean and not new.

pub mod collection;
pub mod error;
pub mod memory;
pub mod traits;

pub use collection::{Collection, Keyed, StorePersister};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryDocumentStore;
pub use traits::DocumentStore;
