//! Tracked key-value mapping.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::attach::{Attach, TrackedContainer};
use crate::binding::Binding;

/// A `BTreeMap<K, V>` that reports its owning field dirty on every mutating call.
///
/// Reads (`get`, `contains_key`, `len`, `keys`, `values`, `iter`, ...) go
/// through `Deref<Target = BTreeMap<K, V>>` and never report.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "K: Serialize + Ord, V: Serialize",
    deserialize = "K: Deserialize<'de> + Ord, V: Deserialize<'de>"
))]
pub struct TrackedMap<K, V> {
    entries: BTreeMap<K, V>,
    #[serde(skip)]
    binding: Option<Binding>,
}

impl<K: Ord, V> TrackedMap<K, V> {
    /// Create an empty, unbound mapping.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            binding: None,
        }
    }

    /// Borrow the wrapped map.
    pub fn as_map(&self) -> &BTreeMap<K, V> {
        &self.entries
    }

    /// Unwrap into the plain map, dropping the binding.
    pub fn into_inner(self) -> BTreeMap<K, V> {
        self.entries
    }

    fn touched(&self) {
        if let Some(binding) = &self.binding {
            binding.report();
        }
    }
}

impl<K: Ord, V: Attach> TrackedMap<K, V> {
    fn adopt(&self, mut value: V) -> V {
        match &self.binding {
            Some(binding) => value.attach(binding),
            None => value.detach(),
        }
        value
    }

    fn release(mut value: V) -> V {
        value.detach();
        value
    }

    /// Set `key` to `value`, returning the previous value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let value = self.adopt(value);
        let previous = self.entries.insert(key, value);
        self.touched();
        previous.map(Self::release)
    }

    /// Delete `key`, returning its value if present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let removed = self.entries.remove(key);
        self.touched();
        removed.map(Self::release)
    }

    /// Remove `key` and return its value, or `default` when absent.
    pub fn pop<Q>(&mut self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove(key).unwrap_or(default)
    }

    /// Remove and return the entry with the greatest key.
    pub fn popitem(&mut self) -> Option<(K, V)> {
        let popped = self.entries.pop_last();
        self.touched();
        popped.map(|(key, value)| (key, Self::release(value)))
    }

    /// Merge every pair of `iter` into the mapping. Reports even when empty.
    pub fn update<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            let value = self.adopt(value);
            self.entries.insert(key, value);
        }
        self.touched();
    }

    /// Return the value for `key`, inserting `default` first if absent.
    ///
    /// Reports only when it inserts. The value is handed back read-only;
    /// edit it through [`get_mut`](Self::get_mut), which reports.
    pub fn setdefault(&mut self, key: K, default: V) -> &V {
        let default = self.adopt(default);
        if !self.entries.contains_key(&key) {
            self.touched();
        }
        self.entries.entry(key).or_insert(default)
    }

    /// Mutable access to one value. Reports on every call that hits.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.entries.contains_key(key) {
            self.touched();
        }
        self.entries.get_mut(key)
    }

    /// Keep only the entries for which `keep` returns `true`.
    pub fn retain<F: FnMut(&K, &V) -> bool>(&mut self, mut keep: F) {
        self.entries.retain(|key, value| {
            let kept = keep(key, &*value);
            if !kept {
                value.detach();
            }
            kept
        });
        self.touched();
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        for value in self.entries.values_mut() {
            value.detach();
        }
        self.entries.clear();
        self.touched();
    }

    /// Run an arbitrary edit against the wrapped map and report once.
    pub fn modify<R, F: FnOnce(&mut BTreeMap<K, V>) -> R>(&mut self, edit: F) -> R {
        let result = edit(&mut self.entries);
        if let Some(binding) = &self.binding {
            for value in self.entries.values_mut() {
                value.attach(binding);
            }
        }
        self.touched();
        result
    }
}

impl<K: Ord, V: Attach> Attach for TrackedMap<K, V> {
    fn attach(&mut self, binding: &Binding) {
        for value in self.entries.values_mut() {
            value.attach(binding);
        }
        self.binding = Some(binding.clone());
    }

    fn detach(&mut self) {
        for value in self.entries.values_mut() {
            value.detach();
        }
        self.binding = None;
    }
}

impl<K: Ord, V: Attach> TrackedContainer for TrackedMap<K, V> {
    fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }
}

impl<K, V> Deref for TrackedMap<K, V> {
    type Target = BTreeMap<K, V>;

    fn deref(&self) -> &BTreeMap<K, V> {
        &self.entries
    }
}

impl<K: Ord, V> Default for TrackedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> From<BTreeMap<K, V>> for TrackedMap<K, V> {
    fn from(entries: BTreeMap<K, V>) -> Self {
        Self {
            entries,
            binding: None,
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for TrackedMap<K, V> {
    fn from(pairs: [(K, V); N]) -> Self {
        BTreeMap::from(pairs).into()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for TrackedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        BTreeMap::from_iter(iter).into()
    }
}

impl<K: Ord, V: Attach> Extend<(K, V)> for TrackedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.update(iter);
    }
}

impl<'a, K, V> IntoIterator for &'a TrackedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = std::collections::btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A copy is a new, unbound mapping.
impl<K: Ord + Clone, V: Clone + Attach> Clone for TrackedMap<K, V> {
    fn clone(&self) -> Self {
        let mut entries = self.entries.clone();
        for value in entries.values_mut() {
            value.detach();
        }
        Self {
            entries,
            binding: None,
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for TrackedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq, V: Eq> Eq for TrackedMap<K, V> {}

impl<K: PartialEq, V: PartialEq> PartialEq<BTreeMap<K, V>> for TrackedMap<K, V> {
    fn eq(&self, other: &BTreeMap<K, V>) -> bool {
        &self.entries == other
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for TrackedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}
