use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use dirtrack_types::{DirtyRecord, FieldName, Lifecycle};
use tracing::{debug, warn};

/// Dirty-state record shared between a tracker and the containers it owns.
pub type SharedRecord = Rc<RefCell<DirtyRecord>>;

/// Hands out [`Binding`]s for one owning instance.
#[derive(Clone)]
pub struct Binder {
    record: Weak<RefCell<DirtyRecord>>,
}

impl Binder {
    /// Create a binder reporting into `record`.
    pub fn new(record: &SharedRecord) -> Self {
        Self {
            record: Rc::downgrade(record),
        }
    }

    /// A binder with no owner. Bindings it produces never report.
    pub fn detached() -> Self {
        Self { record: Weak::new() }
    }

    /// Produce a binding for the top-level field `field`.
    pub fn bind(&self, field: FieldName) -> Binding {
        Binding {
            record: self.record.clone(),
            field,
            revoked: Rc::new(Cell::new(false)),
        }
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("live", &(self.record.strong_count() > 0))
            .finish()
    }
}

/// The `(owner, field)` pair a container reports its mutations to.
///
/// Clones share one revocation flag, so revoking a binding silences every
/// container (nested ones included) that was attached with it.
#[derive(Clone)]
pub struct Binding {
    record: Weak<RefCell<DirtyRecord>>,
    field: FieldName,
    revoked: Rc<Cell<bool>>,
}

impl Binding {
    /// The owning field name.
    pub fn field(&self) -> FieldName {
        self.field
    }

    /// Returns `true` while the owning instance is alive and the binding
    /// has not been revoked.
    pub fn is_live(&self) -> bool {
        !self.revoked.get() && self.record.strong_count() > 0
    }

    /// Stop every holder of this binding from reporting.
    pub fn revoke(&self) {
        self.revoked.set(true);
    }

    /// Lifecycle of the owning instance, or `Destroyed` once it is gone.
    ///
    /// Returns `None` while the owner's record is mutably borrowed.
    pub fn owner_lifecycle(&self) -> Option<Lifecycle> {
        match self.record.upgrade() {
            Some(record) => record.try_borrow().ok().map(|record| record.lifecycle()),
            None => Some(Lifecycle::Destroyed),
        }
    }

    /// Returns `true` if both bindings are unrevoked and point at the same
    /// owner and field.
    pub fn same_target(&self, other: &Binding) -> bool {
        !self.revoked.get()
            && !other.revoked.get()
            && self.field == other.field
            && Weak::ptr_eq(&self.record, &other.record)
    }

    /// Mark the owning field dirty.
    pub fn report(&self) {
        if self.revoked.get() {
            return;
        }
        let Some(record) = self.record.upgrade() else {
            return;
        };
        let Ok(mut record) = record.try_borrow_mut() else {
            warn!(field = self.field, "dirty record busy; container mutation not recorded");
            return;
        };
        match record.mark_dirty(self.field) {
            Ok(first) => debug!(field = self.field, first, "container mutation marked field dirty"),
            Err(err) => warn!(field = self.field, error = %err, "container bound to undeclared field"),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("field", &self.field)
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldName] = &["tags", "labels"];

    fn shared() -> SharedRecord {
        Rc::new(RefCell::new(DirtyRecord::loaded(FIELDS)))
    }

    #[test]
    fn report_marks_field_dirty() {
        let record = shared();
        let binding = Binder::new(&record).bind("tags");
        binding.report();
        assert!(record.borrow().is_field_dirty("tags"));
        assert!(!record.borrow().is_field_dirty("labels"));
    }

    #[test]
    fn detached_binder_never_reports() {
        let binding = Binder::detached().bind("tags");
        assert!(!binding.is_live());
        binding.report();
        assert_eq!(binding.owner_lifecycle(), Some(Lifecycle::Destroyed));
    }

    #[test]
    fn dropped_owner_leaves_no_signal_path() {
        let record = shared();
        let binding = Binder::new(&record).bind("tags");
        assert!(binding.is_live());
        drop(record);
        assert!(!binding.is_live());
        binding.report();
        assert_eq!(binding.owner_lifecycle(), Some(Lifecycle::Destroyed));
    }

    #[test]
    fn undeclared_field_is_ignored() {
        let record = shared();
        Binder::new(&record).bind("bogus").report();
        assert!(!record.borrow().is_dirty());
    }

    #[test]
    fn busy_record_does_not_panic() {
        let record = shared();
        let binding = Binder::new(&record).bind("tags");
        let guard = record.borrow_mut();
        binding.report();
        assert_eq!(binding.owner_lifecycle(), None);
        drop(guard);
        assert!(!record.borrow().is_dirty());
        assert_eq!(binding.owner_lifecycle(), Some(Lifecycle::Loaded));
    }

    #[test]
    fn same_target_compares_owner_and_field() {
        let a = shared();
        let b = shared();
        let tags_a = Binder::new(&a).bind("tags");
        assert!(tags_a.same_target(&Binder::new(&a).bind("tags")));
        assert!(!tags_a.same_target(&Binder::new(&a).bind("labels")));
        assert!(!tags_a.same_target(&Binder::new(&b).bind("tags")));
    }

    #[test]
    fn revoked_binding_is_silent_in_every_clone() {
        let record = shared();
        let binding = Binder::new(&record).bind("tags");
        let nested = binding.clone();
        binding.revoke();
        nested.report();
        assert!(!nested.is_live());
        assert!(!record.borrow().is_dirty());
        assert!(!nested.same_target(&Binder::new(&record).bind("tags")));
    }

    #[test]
    fn owner_lifecycle_follows_record() {
        let record = shared();
        let binding = Binder::new(&record).bind("labels");
        assert_eq!(binding.owner_lifecycle(), Some(Lifecycle::Loaded));
        binding.report();
        assert_eq!(binding.owner_lifecycle(), Some(Lifecycle::Modified));
    }
}
