//! Tracked ordered sequence.

use std::fmt;
use std::ops::{Add, AddAssign, Bound, Deref, Range, RangeBounds};

use serde::{Deserialize, Serialize};

use crate::attach::{Attach, TrackedContainer};
use crate::binding::Binding;

/// A `Vec<T>` that reports its owning field dirty on every mutating call.
///
/// All reads go through `Deref<Target = [T]>`: indexing, `len`, `iter`,
/// `contains`, slicing. There is deliberately no `DerefMut`/`IndexMut`;
/// in-place edits go through [`set`](Self::set), [`get_mut`](Self::get_mut)
/// or [`modify`](Self::modify) so they can be reported.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedVec<T> {
    items: Vec<T>,
    #[serde(skip)]
    binding: Option<Binding>,
}

/// Resolve `range` against a sequence of length `len` without panicking.
fn clamp_range<R: RangeBounds<usize>>(range: &R, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.saturating_add(1),
        Bound::Unbounded => 0,
    }
    .min(len);
    let end = match range.end_bound() {
        Bound::Included(&end) => end.saturating_add(1),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    }
    .clamp(start, len);
    start..end
}

impl<T> TrackedVec<T> {
    /// Create an empty, unbound sequence.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            binding: None,
        }
    }

    /// Borrow the wrapped vector.
    pub fn as_vec(&self) -> &Vec<T> {
        &self.items
    }

    /// Unwrap into the plain vector, dropping the binding.
    pub fn into_inner(self) -> Vec<T> {
        self.items
    }

    fn touched(&self) {
        if let Some(binding) = &self.binding {
            binding.report();
        }
    }
}

impl<T: Attach> TrackedVec<T> {
    fn adopt(&self, mut item: T) -> T {
        match &self.binding {
            Some(binding) => item.attach(binding),
            None => item.detach(),
        }
        item
    }

    fn release(mut item: T) -> T {
        item.detach();
        item
    }

    /// Append an element.
    pub fn push(&mut self, item: T) {
        let item = self.adopt(item);
        self.items.push(item);
        self.touched();
    }

    /// Append every element of `iter`. Reports even when `iter` is empty.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            let item = self.adopt(item);
            self.items.push(item);
        }
        self.touched();
    }

    /// Insert `item` at `index`, shifting later elements right.
    ///
    /// An `index` past the end appends.
    pub fn insert(&mut self, index: usize, item: T) {
        let item = self.adopt(item);
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        self.touched();
    }

    /// Remove and return the element at `index`, or `None` if out of range.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let removed = (index < self.items.len()).then(|| self.items.remove(index));
        self.touched();
        removed.map(Self::release)
    }

    /// Remove the first element equal to `item`. Returns whether one was found.
    pub fn remove_item(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        let position = self.items.iter().position(|candidate| candidate == item);
        if let Some(index) = position {
            drop(Self::release(self.items.remove(index)));
        }
        self.touched();
        position.is_some()
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        let popped = self.items.pop();
        self.touched();
        popped.map(Self::release)
    }

    /// Remove and return the element at `index`.
    pub fn pop_at(&mut self, index: usize) -> Option<T> {
        self.remove(index)
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        for item in self.items.iter_mut() {
            item.detach();
        }
        self.items.clear();
        self.touched();
    }

    /// Replace the element at `index`, returning the previous one.
    ///
    /// Out-of-range indices leave the sequence untouched and return `None`.
    pub fn set(&mut self, index: usize, item: T) -> Option<T> {
        let previous = if index < self.items.len() {
            let item = self.adopt(item);
            Some(Self::release(std::mem::replace(&mut self.items[index], item)))
        } else {
            None
        };
        self.touched();
        previous
    }

    /// Mutable access to one element. Reports on every call that hits.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.items.len() {
            self.touched();
        }
        self.items.get_mut(index)
    }

    /// Replace `range` with the elements of `replace_with` (slice assignment).
    ///
    /// Bounds past the end are clamped to the length, and an inverted range
    /// inserts at its start. Returns the removed elements.
    pub fn splice_range<R, I>(&mut self, range: R, replace_with: I) -> Vec<T>
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = T>,
    {
        let range = clamp_range(&range, self.items.len());
        let incoming: Vec<T> = replace_with.into_iter().map(|item| self.adopt(item)).collect();
        let removed: Vec<T> = self
            .items
            .splice(range, incoming)
            .map(Self::release)
            .collect();
        self.touched();
        removed
    }

    /// Remove `range` and return the removed elements. Bounds are clamped
    /// like [`splice_range`](Self::splice_range).
    pub fn drain<R: RangeBounds<usize>>(&mut self, range: R) -> Vec<T> {
        let range = clamp_range(&range, self.items.len());
        let drained: Vec<T> = self.items.drain(range).map(Self::release).collect();
        self.touched();
        drained
    }

    /// Shorten the sequence to `len` elements.
    pub fn truncate(&mut self, len: usize) {
        if len < self.items.len() {
            for item in self.items[len..].iter_mut() {
                item.detach();
            }
        }
        self.items.truncate(len);
        self.touched();
    }

    /// Keep only the elements for which `keep` returns `true`.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) {
        self.items.retain_mut(|item| {
            let kept = keep(&*item);
            if !kept {
                item.detach();
            }
            kept
        });
        self.touched();
    }

    /// Remove consecutive duplicates.
    pub fn dedup(&mut self)
    where
        T: PartialEq,
    {
        self.items.dedup();
        self.touched();
    }

    /// Sort in ascending order.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.items.sort();
        self.touched();
    }

    /// Sort with a comparator.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        self.items.sort_by(compare);
        self.touched();
    }

    /// Sort by an extracted key.
    pub fn sort_by_key<K, F>(&mut self, key: F)
    where
        F: FnMut(&T) -> K,
        K: Ord,
    {
        self.items.sort_by_key(key);
        self.touched();
    }

    /// Reverse the order of elements in place.
    pub fn reverse(&mut self) {
        self.items.reverse();
        self.touched();
    }

    /// Run an arbitrary edit against the wrapped vector and report once.
    ///
    /// Elements added by `edit` are bound afterwards.
    pub fn modify<R, F: FnOnce(&mut Vec<T>) -> R>(&mut self, edit: F) -> R {
        let result = edit(&mut self.items);
        if let Some(binding) = &self.binding {
            for item in self.items.iter_mut() {
                item.attach(binding);
            }
        }
        self.touched();
        result
    }
}

impl<T: Attach> Attach for TrackedVec<T> {
    fn attach(&mut self, binding: &Binding) {
        for item in self.items.iter_mut() {
            item.attach(binding);
        }
        self.binding = Some(binding.clone());
    }

    fn detach(&mut self) {
        for item in self.items.iter_mut() {
            item.detach();
        }
        self.binding = None;
    }
}

impl<T: Attach> TrackedContainer for TrackedVec<T> {
    fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }
}

impl<T> Deref for TrackedVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for TrackedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for TrackedVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items,
            binding: None,
        }
    }
}

impl<T> FromIterator<T> for TrackedVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Vec::from_iter(iter).into()
    }
}

impl<'a, T> IntoIterator for &'a TrackedVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for TrackedVec<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// A copy is a new, unbound sequence.
impl<T: Clone + Attach> Clone for TrackedVec<T> {
    fn clone(&self) -> Self {
        let mut items = self.items.clone();
        for item in items.iter_mut() {
            item.detach();
        }
        Self {
            items,
            binding: None,
        }
    }
}

impl<T: PartialEq> PartialEq for TrackedVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for TrackedVec<T> {}

impl<T: PartialEq> PartialEq<Vec<T>> for TrackedVec<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        &self.items == other
    }
}

impl<T: fmt::Debug> fmt::Debug for TrackedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

/// `seq += items`: extend in place.
impl<T: Attach, I: IntoIterator<Item = T>> AddAssign<I> for TrackedVec<T> {
    fn add_assign(&mut self, rhs: I) {
        self.extend(rhs);
    }
}

/// `&a + &b`: concatenation into a new, unbound sequence.
impl<T: Clone + Attach> Add<&TrackedVec<T>> for &TrackedVec<T> {
    type Output = TrackedVec<T>;

    fn add(self, rhs: &TrackedVec<T>) -> TrackedVec<T> {
        let mut out = self.clone();
        for item in rhs.items.iter() {
            let mut item = item.clone();
            item.detach();
            out.items.push(item);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    use dirtrack_types::{DirtyRecord, FieldName};

    use super::*;
    use crate::binding::{Binder, SharedRecord};
    use crate::map::TrackedMap;

    const FIELDS: &[FieldName] = &["tags", "rows"];

    fn owner() -> SharedRecord {
        Rc::new(RefCell::new(DirtyRecord::loaded(FIELDS)))
    }

    fn bound(record: &SharedRecord, items: Vec<i64>) -> TrackedVec<i64> {
        let mut seq = TrackedVec::from(items);
        seq.attach(&Binder::new(record).bind("tags"));
        seq
    }

    fn dirty(record: &SharedRecord) -> BTreeSet<FieldName> {
        record.borrow().dirty_fields()
    }

    fn assert_reports(edit: impl FnOnce(&mut TrackedVec<i64>)) {
        let record = owner();
        let mut seq = bound(&record, vec![3, 1, 2]);
        edit(&mut seq);
        assert_eq!(dirty(&record), BTreeSet::from(["tags"]));
    }

    #[test]
    fn every_mutator_reports() {
        assert_reports(|s| s.push(4));
        assert_reports(|s| s.extend([4, 5]));
        assert_reports(|s| s.insert(0, 9));
        assert_reports(|s| {
            s.remove(1);
        });
        assert_reports(|s| {
            s.remove_item(&1);
        });
        assert_reports(|s| {
            s.pop();
        });
        assert_reports(|s| {
            s.pop_at(0);
        });
        assert_reports(|s| s.clear());
        assert_reports(|s| s.sort());
        assert_reports(|s| s.sort_by(|a, b| b.cmp(a)));
        assert_reports(|s| s.sort_by_key(|v| -v));
        assert_reports(|s| s.reverse());
        assert_reports(|s| {
            s.set(0, 7);
        });
        assert_reports(|s| {
            s.splice_range(0..1, [8, 8]);
        });
        assert_reports(|s| {
            s.drain(..);
        });
        assert_reports(|s| s.truncate(1));
        assert_reports(|s| s.retain(|v| *v > 1));
        assert_reports(|s| s.dedup());
        assert_reports(|s| *s += vec![10]);
        assert_reports(|s| s.modify(|v| v.push(11)));
        assert_reports(|s| {
            if let Some(v) = s.get_mut(0) {
                *v = 42;
            }
        });
    }

    #[test]
    fn empty_input_still_reports() {
        assert_reports(|s| s.extend(Vec::new()));
        assert_reports(|s| *s += Vec::new());
        assert_reports(|s| {
            s.remove_item(&100);
        });
        assert_reports(|s| {
            s.set(99, 1);
        });
    }

    #[test]
    fn reads_never_report() {
        let record = owner();
        let seq = bound(&record, vec![1, 2, 3]);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq[1], 2);
        assert!(seq.contains(&3));
        assert_eq!(seq.iter().sum::<i64>(), 6);
        assert_eq!(&seq[..2], &[1, 2]);
        assert_eq!(seq.first(), Some(&1));
        let joined = &seq + &TrackedVec::from(vec![4]);
        assert_eq!(joined, vec![1, 2, 3, 4]);
        assert!(!joined.is_bound());
        assert!(dirty(&record).is_empty());
    }

    #[test]
    fn unbound_sequence_has_no_side_effects() {
        let mut seq = TrackedVec::from(vec![1]);
        seq.push(2);
        seq.clear();
        assert!(seq.is_empty());
        assert!(!seq.is_bound());
    }

    #[test]
    fn get_mut_out_of_range_does_not_report() {
        let record = owner();
        let mut seq = bound(&record, vec![1]);
        assert!(seq.get_mut(5).is_none());
        assert!(dirty(&record).is_empty());
    }

    #[test]
    fn mutation_semantics_match_vec() {
        let mut seq = TrackedVec::from(vec![5, 3, 4]);
        seq.push(1);
        seq.sort();
        assert_eq!(seq, vec![1, 3, 4, 5]);
        assert_eq!(seq.remove(0), Some(1));
        assert_eq!(seq.remove(10), None);
        assert_eq!(seq.set(0, 30), Some(3));
        assert_eq!(seq.splice_range(1..2, [40, 41]), vec![4]);
        assert_eq!(seq, vec![30, 40, 41, 5]);
        assert_eq!(seq.drain(2..), vec![41, 5]);
        seq.reverse();
        assert_eq!(seq.into_inner(), vec![40, 30]);
    }

    #[test]
    fn clone_is_unbound_copy() {
        let record = owner();
        let seq = bound(&record, vec![1]);
        let mut copy = seq.clone();
        copy.push(2);
        assert!(dirty(&record).is_empty());
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn nested_mapping_reports_top_level_field() {
        let record = owner();
        let mut rows: TrackedVec<TrackedMap<String, i64>> = TrackedVec::new();
        rows.attach(&Binder::new(&record).bind("rows"));
        rows.push(TrackedMap::new());
        record.borrow_mut().clear();

        if let Some(row) = rows.get_mut(0) {
            row.insert("a".into(), 1);
        }
        assert_eq!(dirty(&record), BTreeSet::from(["rows"]));

        record.borrow_mut().clear();
        let mut inner = rows.pop().expect("row present");
        record.borrow_mut().clear();
        inner.insert("b".into(), 2);
        assert!(dirty(&record).is_empty(), "popped rows are unbound");
    }

    #[test]
    fn elements_added_through_modify_are_bound() {
        let record = owner();
        let mut rows: TrackedVec<TrackedMap<String, i64>> = TrackedVec::new();
        rows.attach(&Binder::new(&record).bind("rows"));
        rows.modify(|v| v.push(TrackedMap::new()));
        record.borrow_mut().clear();
        assert!(rows[0].is_bound());
    }

    #[test]
    fn serializes_as_plain_array() {
        let seq = TrackedVec::from(vec![1, 2]);
        assert_eq!(serde_json::to_value(&seq).unwrap(), serde_json::json!([1, 2]));
        let back: TrackedVec<i64> = serde_json::from_str("[3]").unwrap();
        assert_eq!(back, vec![3]);
        assert!(!back.is_bound());
    }

    #[test]
    fn out_of_range_positions_are_clamped() {
        let record = owner();
        let mut seq = bound(&record, vec![1, 2, 3]);
        seq.insert(99, 4);
        assert_eq!(seq, vec![1, 2, 3, 4]);

        assert_eq!(seq.splice_range(2..50, [9]), vec![3, 4]);
        assert_eq!(seq, vec![1, 2, 9]);

        assert!(seq.splice_range(10.., [7]).is_empty());
        assert_eq!(seq, vec![1, 2, 9, 7]);

        #[allow(clippy::reversed_empty_ranges)]
        let inverted = 2..1;
        assert!(seq.splice_range(inverted, [0]).is_empty());
        assert_eq!(seq, vec![1, 2, 0, 9, 7]);

        assert_eq!(seq.drain(3..=100), vec![9, 7]);
        assert!(seq.drain(40..).is_empty());
        assert_eq!(seq, vec![1, 2, 0]);
        assert_eq!(dirty(&record), BTreeSet::from(["tags"]));
    }
}
