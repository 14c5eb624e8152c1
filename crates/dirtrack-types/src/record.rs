//! Per-instance dirty-state bookkeeping.
//!
//! A [`DirtyRecord`] owns exactly two pieces of state: whether the instance
//! has ever been persisted, and which declared fields changed since the last
//! reset. It knows nothing about values, hooks, or persistence; those belong
//! to the tracker that owns the record.

use std::collections::BTreeSet;

use crate::error::TypeError;
use crate::lifecycle::Lifecycle;
use crate::FieldName;

/// Dirty-state record of a single tracked instance.
///
/// Invariants:
/// - `dirty_fields() ⊆ declared()` at all times.
/// - Once `is_new()` is `false` it never becomes `true` again.
/// - After [`clear`](Self::clear) or [`mark_saved`](Self::mark_saved) the
///   dirty set is empty; only `mark_saved` touches `is_new`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirtyRecord {
    declared: &'static [FieldName],
    is_new: bool,
    dirty: BTreeSet<FieldName>,
    state: Lifecycle,
}

impl DirtyRecord {
    /// Record for a freshly constructed instance.
    ///
    /// Every supplied field counts as changed-from-absent. Unknown names are
    /// rejected so the dirty set never escapes the declared fields.
    pub fn created<'a, I>(declared: &'static [FieldName], supplied: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut record = Self {
            declared,
            is_new: true,
            dirty: BTreeSet::new(),
            state: Lifecycle::Created,
        };
        for field in supplied {
            let name = record.resolve(field)?;
            record.dirty.insert(name);
        }
        Ok(record)
    }

    /// Record for a freshly constructed instance where every declared field
    /// was supplied.
    pub fn created_all(declared: &'static [FieldName]) -> Self {
        Self {
            declared,
            is_new: true,
            dirty: declared.iter().copied().collect(),
            state: Lifecycle::Created,
        }
    }

    /// Record for an instance read back from storage: not new, clean.
    pub fn loaded(declared: &'static [FieldName]) -> Self {
        Self {
            declared,
            is_new: false,
            dirty: BTreeSet::new(),
            state: Lifecycle::Loaded,
        }
    }

    /// Declared field names of the owning model.
    pub fn declared(&self) -> &'static [FieldName] {
        self.declared
    }

    /// Map a field name onto its declared `'static` form.
    pub fn resolve(&self, field: &str) -> Result<FieldName, TypeError> {
        self.declared
            .iter()
            .copied()
            .find(|declared| *declared == field)
            .ok_or_else(|| TypeError::UnknownField(field.to_string()))
    }

    /// Returns `true` if `field` is a declared field.
    pub fn is_declared(&self, field: &str) -> bool {
        self.declared.iter().any(|declared| *declared == field)
    }

    /// Returns `true` until the first successful save.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Returns `true` iff at least one field is dirty.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Returns `true` if `field` is currently dirty.
    pub fn is_field_dirty(&self, field: &str) -> bool {
        self.dirty.contains(field)
    }

    /// Snapshot of the dirty field names. Mutating it does not affect the record.
    pub fn dirty_fields(&self) -> BTreeSet<FieldName> {
        self.dirty.clone()
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    /// Record an accepted change to `field`.
    ///
    /// Returns `true` if the field was not already dirty.
    pub fn mark_dirty(&mut self, field: &str) -> Result<bool, TypeError> {
        let name = self.resolve(field)?;
        self.state = Lifecycle::Modified;
        Ok(self.dirty.insert(name))
    }

    /// Forget every dirty field without touching `is_new`.
    pub fn clear(&mut self) {
        self.dirty.clear();
        self.state = Lifecycle::Loaded;
    }

    /// Apply the post-save reset: no longer new, nothing dirty.
    pub fn mark_saved(&mut self) {
        self.is_new = false;
        self.clear();
    }

    /// Whether a non-forced save has anything to do.
    pub fn needs_save(&self) -> bool {
        self.is_new || self.is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FIELDS: &[FieldName] = &["status", "tags", "owner"];

    #[test]
    fn created_marks_supplied_fields() {
        let record = DirtyRecord::created(FIELDS, ["status", "tags"]).unwrap();
        assert!(record.is_new());
        assert!(record.is_dirty());
        assert_eq!(record.dirty_fields(), BTreeSet::from(["status", "tags"]));
        assert_eq!(record.lifecycle(), Lifecycle::Created);
    }

    #[test]
    fn created_with_nothing_supplied_is_clean_but_new() {
        let record = DirtyRecord::created(FIELDS, []).unwrap();
        assert!(record.is_new());
        assert!(!record.is_dirty());
        assert!(record.needs_save());
    }

    #[test]
    fn created_rejects_unknown_field() {
        let err = DirtyRecord::created(FIELDS, ["colour"]).unwrap_err();
        assert_eq!(err, TypeError::UnknownField("colour".into()));
    }

    #[test]
    fn created_all_marks_every_declared_field() {
        let record = DirtyRecord::created_all(FIELDS);
        assert_eq!(record.dirty_fields().len(), FIELDS.len());
    }

    #[test]
    fn loaded_is_clean_and_not_new() {
        let record = DirtyRecord::loaded(FIELDS);
        assert!(!record.is_new());
        assert!(!record.is_dirty());
        assert!(!record.needs_save());
        assert_eq!(record.lifecycle(), Lifecycle::Loaded);
    }

    #[test]
    fn mark_dirty_reports_first_insertion() {
        let mut record = DirtyRecord::loaded(FIELDS);
        assert!(record.mark_dirty("owner").unwrap());
        assert!(!record.mark_dirty("owner").unwrap());
        assert!(record.is_field_dirty("owner"));
        assert_eq!(record.lifecycle(), Lifecycle::Modified);
    }

    #[test]
    fn mark_dirty_rejects_undeclared() {
        let mut record = DirtyRecord::loaded(FIELDS);
        assert!(record.mark_dirty("nope").is_err());
        assert!(!record.is_dirty());
        assert_eq!(record.lifecycle(), Lifecycle::Loaded);
    }

    #[test]
    fn clear_keeps_is_new() {
        let mut record = DirtyRecord::created_all(FIELDS);
        record.clear();
        assert!(!record.is_dirty());
        assert!(record.is_new());
        assert_eq!(record.lifecycle(), Lifecycle::Loaded);
    }

    #[test]
    fn mark_saved_resets_everything() {
        let mut record = DirtyRecord::created_all(FIELDS);
        record.mark_saved();
        assert!(!record.is_new());
        assert!(!record.is_dirty());
    }

    #[test]
    fn snapshot_is_detached() {
        let record = DirtyRecord::created(FIELDS, ["status"]).unwrap();
        let mut snapshot = record.dirty_fields();
        snapshot.insert("owner");
        snapshot.remove("status");
        assert_eq!(record.dirty_fields(), BTreeSet::from(["status"]));
    }

    #[derive(Clone, Debug)]
    enum Step {
        Mark(usize),
        Clear,
        Save,
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0usize..4).prop_map(Step::Mark),
            Just(Step::Clear),
            Just(Step::Save),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

        #[test]
        fn invariants_hold_for_any_step_sequence(steps in prop::collection::vec(step_strategy(), 0..32)) {
            let mut record = DirtyRecord::created_all(FIELDS);
            let mut saved_once = false;

            for step in steps {
                match step {
                    Step::Mark(i) => {
                        let name = ["status", "tags", "owner", "bogus"][i];
                        let _ = record.mark_dirty(name);
                    }
                    Step::Clear => record.clear(),
                    Step::Save => {
                        record.mark_saved();
                        saved_once = true;
                    }
                }

                prop_assert!(record.dirty_fields().iter().all(|f| FIELDS.contains(f)));
                prop_assert_eq!(record.is_new(), !saved_once);
                prop_assert_eq!(record.is_dirty(), !record.dirty_fields().is_empty());
            }
        }
    }
}
