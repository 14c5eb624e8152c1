//! Tracked unique-element set.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Deref, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::attach::{Attach, TrackedContainer};
use crate::binding::Binding;

/// A `BTreeSet<T>` that reports its owning field dirty on every mutating call.
///
/// Membership, length, iteration, and the subset/superset/disjoint tests go
/// through `Deref<Target = BTreeSet<T>>`. The algebra methods
/// ([`union`](Self::union), [`intersection`](Self::intersection), ...) and
/// their operator forms on references return new, unbound sets; the
/// `*_update` methods and the assigning operators mutate in place.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "T: Serialize + Ord",
    deserialize = "T: Deserialize<'de> + Ord"
))]
pub struct TrackedSet<T> {
    elements: BTreeSet<T>,
    #[serde(skip)]
    binding: Option<Binding>,
}

impl<T: Ord> TrackedSet<T> {
    /// Create an empty, unbound set.
    pub fn new() -> Self {
        Self {
            elements: BTreeSet::new(),
            binding: None,
        }
    }

    /// Borrow the wrapped set.
    pub fn as_set(&self) -> &BTreeSet<T> {
        &self.elements
    }

    /// Unwrap into the plain set, dropping the binding.
    pub fn into_inner(self) -> BTreeSet<T> {
        self.elements
    }

    fn touched(&self) {
        if let Some(binding) = &self.binding {
            binding.report();
        }
    }

    /// Add an element. Returns `true` if it was not already present.
    pub fn add(&mut self, element: T) -> bool {
        let added = self.elements.insert(element);
        self.touched();
        added
    }

    /// Remove an element. Returns `true` if it was present.
    pub fn remove<Q>(&mut self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let removed = self.elements.remove(element);
        self.touched();
        removed
    }

    /// Remove an element if present.
    pub fn discard<Q>(&mut self, element: &Q)
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.elements.remove(element);
        self.touched();
    }

    /// Remove and return the smallest element.
    pub fn pop(&mut self) -> Option<T> {
        let popped = self.elements.pop_first();
        self.touched();
        popped
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.touched();
    }

    /// Keep only the elements for which `keep` returns `true`.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.elements.retain(keep);
        self.touched();
    }

    /// In-place union with `other`.
    pub fn union_update<I: IntoIterator<Item = T>>(&mut self, other: I) {
        self.elements.extend(other);
        self.touched();
    }

    /// In-place intersection with `other`.
    pub fn intersection_update<I: IntoIterator<Item = T>>(&mut self, other: I) {
        let keep: BTreeSet<T> = other.into_iter().collect();
        self.elements.retain(|element| keep.contains(element));
        self.touched();
    }

    /// In-place difference: remove every element of `other`.
    pub fn difference_update<I: IntoIterator<Item = T>>(&mut self, other: I) {
        for element in other {
            self.elements.remove(&element);
        }
        self.touched();
    }

    /// In-place symmetric difference with `other`.
    pub fn symmetric_difference_update<I: IntoIterator<Item = T>>(&mut self, other: I) {
        let other: BTreeSet<T> = other.into_iter().collect();
        for element in other {
            if !self.elements.remove(&element) {
                self.elements.insert(element);
            }
        }
        self.touched();
    }

    /// Run an arbitrary edit against the wrapped set and report once.
    pub fn modify<R, F: FnOnce(&mut BTreeSet<T>) -> R>(&mut self, edit: F) -> R {
        let result = edit(&mut self.elements);
        self.touched();
        result
    }
}

impl<T: Ord + Clone> TrackedSet<T> {
    /// New unbound set with the elements of both sets.
    pub fn union(&self, other: &TrackedSet<T>) -> TrackedSet<T> {
        self.elements.union(&other.elements).cloned().collect()
    }

    /// New unbound set with the elements common to both sets.
    pub fn intersection(&self, other: &TrackedSet<T>) -> TrackedSet<T> {
        self.elements.intersection(&other.elements).cloned().collect()
    }

    /// New unbound set with the elements of `self` not in `other`.
    pub fn difference(&self, other: &TrackedSet<T>) -> TrackedSet<T> {
        self.elements.difference(&other.elements).cloned().collect()
    }

    /// New unbound set with the elements in exactly one of the sets.
    pub fn symmetric_difference(&self, other: &TrackedSet<T>) -> TrackedSet<T> {
        self.elements
            .symmetric_difference(&other.elements)
            .cloned()
            .collect()
    }
}

impl<T: Ord> Attach for TrackedSet<T> {
    fn attach(&mut self, binding: &Binding) {
        self.binding = Some(binding.clone());
    }

    fn detach(&mut self) {
        self.binding = None;
    }
}

impl<T: Ord> TrackedContainer for TrackedSet<T> {
    fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }
}

impl<T> Deref for TrackedSet<T> {
    type Target = BTreeSet<T>;

    fn deref(&self) -> &BTreeSet<T> {
        &self.elements
    }
}

impl<T: Ord> Default for TrackedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> From<BTreeSet<T>> for TrackedSet<T> {
    fn from(elements: BTreeSet<T>) -> Self {
        Self {
            elements,
            binding: None,
        }
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for TrackedSet<T> {
    fn from(elements: [T; N]) -> Self {
        BTreeSet::from(elements).into()
    }
}

impl<T: Ord> FromIterator<T> for TrackedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        BTreeSet::from_iter(iter).into()
    }
}

impl<T: Ord> Extend<T> for TrackedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.union_update(iter);
    }
}

impl<'a, T> IntoIterator for &'a TrackedSet<T> {
    type Item = &'a T;
    type IntoIter = std::collections::btree_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// A copy is a new, unbound set.
impl<T: Ord + Clone> Clone for TrackedSet<T> {
    fn clone(&self) -> Self {
        self.elements.clone().into()
    }
}

impl<T: PartialEq> PartialEq for TrackedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl<T: Eq> Eq for TrackedSet<T> {}

impl<T: PartialEq> PartialEq<BTreeSet<T>> for TrackedSet<T> {
    fn eq(&self, other: &BTreeSet<T>) -> bool {
        &self.elements == other
    }
}

impl<T: fmt::Debug> fmt::Debug for TrackedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.elements.iter()).finish()
    }
}

macro_rules! set_operator {
    ($op:ident, $method:ident, $assign:ident, $assign_method:ident, $algebra:ident, $update:ident) => {
        impl<T: Ord + Clone> $op<&TrackedSet<T>> for &TrackedSet<T> {
            type Output = TrackedSet<T>;

            fn $method(self, rhs: &TrackedSet<T>) -> TrackedSet<T> {
                self.$algebra(rhs)
            }
        }

        impl<T: Ord + Clone> $assign<&TrackedSet<T>> for TrackedSet<T> {
            fn $assign_method(&mut self, rhs: &TrackedSet<T>) {
                self.$update(rhs.elements.iter().cloned());
            }
        }
    };
}

set_operator!(BitOr, bitor, BitOrAssign, bitor_assign, union, union_update);
set_operator!(BitAnd, bitand, BitAndAssign, bitand_assign, intersection, intersection_update);
set_operator!(Sub, sub, SubAssign, sub_assign, difference, difference_update);
set_operator!(
    BitXor,
    bitxor,
    BitXorAssign,
    bitxor_assign,
    symmetric_difference,
    symmetric_difference_update
);
