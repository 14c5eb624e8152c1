//! Prefix-scoped collections of tracked models.

use std::fmt;
use std::marker::PhantomData;

use dirtrack_tracker::{Model, Persister, Tracked, TrackedBuilder, TrackerConfig};
use dirtrack_types::PersistError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

/// A model that knows the key of its own document.
pub trait Keyed {
    /// Key of this instance, unique within its collection.
    fn key(&self) -> String;
}

/// Models of one kind stored under `<prefix>:<key>` in a [`DocumentStore`].
#[derive(Clone, Debug)]
pub struct Collection<S> {
    store: S,
    prefix: String,
    config: TrackerConfig,
}

impl<S> Collection<S>
where
    S: DocumentStore + Clone + 'static,
{
    /// A collection over `store` whose documents live under `prefix`.
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            config: TrackerConfig::default(),
        }
    }

    /// Tracker configuration for every instance this collection hands out.
    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Full store key for the model key `key`.
    pub fn document_key(&self, key: &str) -> String {
        format!("{}:{key}", self.prefix)
    }

    /// A persister writing models into this collection.
    pub fn persister<M>(&self) -> StorePersister<S, M> {
        StorePersister {
            store: self.store.clone(),
            prefix: self.prefix.clone(),
            _model: PhantomData,
        }
    }

    /// Start tracking a freshly constructed model that saves here.
    pub fn track<M>(&self, model: M) -> StoreResult<Tracked<M>>
    where
        M: Model + Keyed,
    {
        self.track_with(Tracked::builder(model))
    }

    /// Finish `builder` with this collection's persister and config.
    pub fn track_with<M>(&self, builder: TrackedBuilder<M>) -> StoreResult<Tracked<M>>
    where
        M: Model + Keyed,
    {
        Ok(builder
            .persister(self.persister())
            .config(self.config.clone())
            .build()?)
    }

    /// Read the model stored under `key`. It starts clean and not new.
    pub fn load<M>(&self, key: &str) -> StoreResult<Tracked<M>>
    where
        M: Model + Keyed + DeserializeOwned,
    {
        let document_key = self.document_key(key);
        let document = self
            .store
            .get(&document_key)?
            .ok_or_else(|| StoreError::NotFound(document_key.clone()))?;
        let model: M = serde_json::from_value(document)?;
        debug!(key = %document_key, "model loaded");
        self.track_with(Tracked::builder(model).loaded())
    }

    /// The raw stored document for `key`.
    pub fn get_raw(&self, key: &str) -> StoreResult<Option<Value>> {
        self.store.get(&self.document_key(key))
    }

    /// Remove the document for `key`. Returns `true` if one existed.
    pub fn delete(&self, key: &str) -> StoreResult<bool> {
        self.store.delete(&self.document_key(key))
    }

    /// Sorted model keys present in this collection.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let prefix = format!("{}:", self.prefix);
        Ok(self
            .store
            .keys(&prefix)?
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }
}

/// [`Persister`] that writes a model's JSON form into a [`DocumentStore`].
pub struct StorePersister<S, M> {
    store: S,
    prefix: String,
    _model: PhantomData<fn(&M)>,
}

impl<S, M> Persister<M> for StorePersister<S, M>
where
    S: DocumentStore,
    M: Serialize + Keyed,
{
    fn persist(&mut self, model: &M) -> Result<(), PersistError> {
        let key = format!("{}:{}", self.prefix, model.key());
        let document = serde_json::to_value(model).map_err(StoreError::from)?;
        self.store.put(&key, document)?;
        Ok(())
    }
}

impl<S: fmt::Debug, M> fmt::Debug for StorePersister<S, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorePersister")
            .field("store", &self.store)
            .field("prefix", &self.prefix)
            .finish()
    }
}
