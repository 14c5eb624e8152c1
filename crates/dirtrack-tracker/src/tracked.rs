//! The dirty-state tracker.
//!
//! [`Tracked`] owns a host model together with its [`DirtyRecord`]. Every
//! field assignment goes through [`Tracked::set`], which compares, consults
//! `onchange`, commits (binding containers to the field), marks the field
//! dirty, and finally calls `onchanged`. Container fields are mutated in
//! place through [`Tracked::container`] and report themselves.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use dirtrack_containers::{Attach, Binder, Binding, SharedRecord, TrackedContainer};
use dirtrack_types::{DirtyRecord, FieldName, Lifecycle};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::TrackerConfig;
use crate::diff::{diff_fields, snapshot_of, ChangeReport, FieldSnapshot};
use crate::error::{TrackError, TrackResult};
use crate::hooks::ChangeHooks;
use crate::model::{Field, FieldValue, Model};
use crate::persist::{Persister, SaveOutcome};

/// Outcome of [`Tracked::set`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Assignment<T> {
    /// The new value equals the current one. Nothing happened; the value is
    /// handed back.
    Unchanged(T),
    /// `onchange` returned `false`. Nothing happened; the value is handed back.
    Vetoed(T),
    /// The value was installed and the field marked dirty.
    Committed {
        /// The value that was replaced, detached from the field.
        previous: T,
    },
}

impl<T> Assignment<T> {
    /// Returns `true` if the assignment took effect.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// Returns `true` if `onchange` rejected the assignment.
    pub fn is_vetoed(&self) -> bool {
        matches!(self, Self::Vetoed(_))
    }
}

/// A host model with dirty-state tracking attached.
///
/// Reads go through `Deref<Target = M>`; writes go through [`set`](Self::set)
/// for whole-value assignment and [`container`](Self::container) for in-place
/// container edits.
pub struct Tracked<M: Model> {
    model: M,
    record: SharedRecord,
    hooks: Option<Rc<dyn ChangeHooks<M>>>,
    persister: Option<Box<dyn Persister<M>>>,
    config: TrackerConfig,
    originals: Option<FieldSnapshot>,
}

impl<M: Model> Tracked<M> {
    /// Track a freshly constructed model. Every declared field counts as
    /// supplied, so all of them start dirty.
    pub fn new(model: M) -> Self {
        Self::assemble(
            model,
            DirtyRecord::created_all(M::FIELDS),
            M::class_hooks(),
            None,
            TrackerConfig::default(),
        )
    }

    /// Track a model that was just read back from storage: not new, clean.
    pub fn load(model: M) -> Self {
        Self::assemble(
            model,
            DirtyRecord::loaded(M::FIELDS),
            M::class_hooks(),
            None,
            TrackerConfig::default(),
        )
    }

    /// Start configuring a tracker for `model`.
    pub fn builder(model: M) -> TrackedBuilder<M> {
        TrackedBuilder::new(model)
    }

    fn assemble(
        mut model: M,
        record: DirtyRecord,
        hooks: Option<Rc<dyn ChangeHooks<M>>>,
        persister: Option<Box<dyn Persister<M>>>,
        config: TrackerConfig,
    ) -> Self {
        let record = Rc::new(RefCell::new(record));
        model.attach(&Binder::new(&record));
        let mut tracked = Self {
            model,
            record,
            hooks,
            persister,
            config,
            originals: None,
        };
        tracked.capture_originals();
        tracked
    }

    // ---- Queries ----

    /// Borrow the host model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Read one field.
    pub fn get<T>(&self, field: &Field<M, T>) -> &T {
        field.get(&self.model)
    }

    /// Returns `true` until the first successful save.
    pub fn is_new(&self) -> bool {
        self.record.borrow().is_new()
    }

    /// Returns `true` iff at least one field changed since the last reset.
    pub fn is_dirty(&self) -> bool {
        self.record.borrow().is_dirty()
    }

    /// Snapshot of the dirty field names.
    pub fn dirty_fields(&self) -> BTreeSet<FieldName> {
        self.record.borrow().dirty_fields()
    }

    /// Returns `true` if `field` changed since the last reset.
    pub fn is_field_dirty(&self, field: &str) -> bool {
        self.record.borrow().is_field_dirty(field)
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.record.borrow().lifecycle()
    }

    /// The tracker configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Returns `true` if a persistence action is configured.
    pub fn has_persister(&self) -> bool {
        self.persister.is_some()
    }

    /// The serialized value of `field` as of the last baseline.
    pub fn original(&self, field: &str) -> Option<&Value> {
        self.originals.as_ref()?.get(field)
    }

    /// Field-level diff of the dirty fields against the last baseline.
    pub fn changes(&self) -> TrackResult<ChangeReport> {
        let originals = self.originals.as_ref().ok_or(TrackError::SnapshotDisabled)?;
        let current = snapshot_of(serde_json::to_value(&self.model)?);
        let dirty = self.dirty_fields();
        Ok(diff_fields(originals, &current, &dirty))
    }

    // ---- Mutation ----

    /// Assign `value` to `field`.
    ///
    /// Equal values are a no-op. Otherwise `onchange` may veto; on acceptance
    /// the value is installed (containers are bound to the field), the field
    /// is marked dirty, and `onchanged` observes the old value. Hook errors
    /// are returned as [`TrackError::Hook`]; an `onchanged` error arrives
    /// after the change was committed.
    pub fn set<T: FieldValue>(&mut self, field: &Field<M, T>, value: T) -> TrackResult<Assignment<T>> {
        let name = self.record.borrow().resolve(field.name())?;

        if *field.get(&self.model) == value {
            if self.config.log_unchanged {
                trace!(field = name, "assignment skipped: value unchanged");
            }
            return Ok(Assignment::Unchanged(value));
        }

        let hooks = self.hooks.clone();
        let mut old = Value::Null;
        if let Some(hooks) = &hooks {
            let proposed = serde_json::to_value(&value)?;
            if !hooks.onchange(&self.model, name, &proposed)? {
                debug!(field = name, "assignment vetoed by onchange");
                return Ok(Assignment::Vetoed(value));
            }
            old = serde_json::to_value(field.get(&self.model))?;
        }

        let mut value = value;
        value.attach(&Binder::new(&self.record).bind(name));
        let mut previous = std::mem::replace(field.get_mut(&mut self.model), value);
        previous.detach();
        self.record.borrow_mut().mark_dirty(name)?;
        debug!(field = name, "field assignment committed");

        if let Some(hooks) = &hooks {
            hooks.onchanged(&self.model, name, &old)?;
        }
        Ok(Assignment::Committed { previous })
    }

    /// Mutable access to a container field for in-place edits.
    ///
    /// Only container types are reachable here; their mutating calls mark
    /// the field dirty without going through the hooks. Replacing the whole
    /// container through the guard (`*guard = ..`, `mem::take`) is recorded
    /// the same way: when the guard drops, the value moved out stops
    /// reporting, the new value is bound to the field and the field is
    /// marked dirty. Use [`set`](Self::set) to have a replacement seen by
    /// the hooks.
    pub fn container<T: TrackedContainer>(&mut self, field: &Field<M, T>) -> ContainerMut<'_, T> {
        let binder = Binder::new(&self.record);
        let slot = field.get_mut(&mut self.model);
        let expected = binder.bind(field.name());
        if !slot.binding().is_some_and(|binding| binding.same_target(&expected)) {
            slot.attach(&expected);
        }
        let installed = slot.binding().cloned();
        ContainerMut {
            slot,
            binder,
            field: field.name(),
            installed,
        }
    }

    /// Forget every dirty field. `is_new` is left alone.
    pub fn clear_dirty(&mut self) {
        self.record.borrow_mut().clear();
        self.capture_originals();
        debug!("dirty fields cleared");
    }

    // ---- Persistence ----

    /// Returns `true` if a save with this `force` flag has work to do.
    pub fn should_save(&self, force: bool) -> bool {
        force || self.record.borrow().needs_save()
    }

    /// Persist the model through the configured [`Persister`].
    ///
    /// A clean, non-new instance is skipped unless `force` is set. When the
    /// save runs, success marks the instance saved and clean; failure leaves
    /// every piece of tracker state as it was.
    pub fn save(&mut self, force: bool) -> TrackResult<SaveOutcome> {
        if !self.should_save(force) {
            debug!("save skipped: instance is clean");
            return Ok(SaveOutcome::Skipped);
        }
        let Some(persister) = self.persister.as_mut() else {
            warn!("save called without a persistence action");
            return Err(TrackError::NoPersistence);
        };
        persister.persist(&self.model)?;
        self.mark_saved();
        Ok(SaveOutcome::Saved(()))
    }

    /// Apply the post-save reset: not new, nothing dirty, new baseline.
    pub(crate) fn mark_saved(&mut self) {
        self.record.borrow_mut().mark_saved();
        self.capture_originals();
        debug!("instance saved");
    }

    /// Stop tracking and hand back the model. Its containers are unbound.
    pub fn into_inner(self) -> M {
        let Self { mut model, .. } = self;
        model.attach(&Binder::detached());
        model
    }

    fn capture_originals(&mut self) {
        if !self.config.capture_originals {
            self.originals = None;
            return;
        }
        match serde_json::to_value(&self.model) {
            Ok(value) => self.originals = Some(snapshot_of(value)),
            Err(err) => {
                warn!(error = %err, "failed to capture original values");
                self.originals = Some(FieldSnapshot::new());
            }
        }
    }
}

impl<M: Model> Deref for Tracked<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.model
    }
}

impl<M: Model + fmt::Debug> fmt::Debug for Tracked<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record.borrow();
        f.debug_struct("Tracked")
            .field("model", &self.model)
            .field("is_new", &record.is_new())
            .field("dirty_fields", &record.dirty_fields())
            .field("has_hooks", &self.hooks.is_some())
            .field("has_persister", &self.persister.is_some())
            .finish()
    }
}

/// Borrow of a container field handed out by [`Tracked::container`].
///
/// Dereferences to the container. On drop, a container that no longer
/// carries the field's binding was replaced through the guard: the binding
/// the old value took with it is revoked, the new value is bound in place
/// and the field is marked dirty.
pub struct ContainerMut<'a, T: TrackedContainer> {
    slot: &'a mut T,
    binder: Binder,
    field: FieldName,
    installed: Option<Binding>,
}

impl<T: TrackedContainer> Deref for ContainerMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &*self.slot
    }
}

impl<T: TrackedContainer> DerefMut for ContainerMut<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut *self.slot
    }
}

impl<T: TrackedContainer> Drop for ContainerMut<'_, T> {
    fn drop(&mut self) {
        let expected = self.binder.bind(self.field);
        if self.slot.binding().is_some_and(|binding| binding.same_target(&expected)) {
            return;
        }
        if let Some(installed) = self.installed.take() {
            installed.revoke();
        }
        self.slot.attach(&expected);
        expected.report();
        debug!(field = self.field, "container replaced in place; field marked dirty");
    }
}

impl<T: TrackedContainer + fmt::Debug> fmt::Debug for ContainerMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerMut")
            .field("field", &self.field)
            .field("value", &self.slot)
            .finish()
    }
}

/// Configures a [`Tracked`] instance before tracking starts.
pub struct TrackedBuilder<M: Model> {
    model: M,
    supplied: Option<Vec<String>>,
    hooks: Option<Rc<dyn ChangeHooks<M>>>,
    persister: Option<Box<dyn Persister<M>>>,
    config: TrackerConfig,
    loaded: bool,
}

impl<M: Model> TrackedBuilder<M> {
    fn new(model: M) -> Self {
        Self {
            model,
            supplied: None,
            hooks: None,
            persister: None,
            config: TrackerConfig::default(),
            loaded: false,
        }
    }

    /// Only these fields were given initial values; only they start dirty.
    pub fn supplied<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supplied = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Per-instance hooks. They take precedence over the model's class hooks.
    pub fn hooks(mut self, hooks: impl ChangeHooks<M> + 'static) -> Self {
        self.hooks = Some(Rc::new(hooks));
        self
    }

    /// Per-instance hooks shared with other instances.
    pub fn shared_hooks(mut self, hooks: Rc<dyn ChangeHooks<M>>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// The persistence action used by [`Tracked::save`].
    pub fn persister(mut self, persister: impl Persister<M> + 'static) -> Self {
        self.persister = Some(Box::new(persister));
        self
    }

    /// Tracker configuration.
    pub fn config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    /// The model came from storage: start not new and clean.
    pub fn loaded(mut self) -> Self {
        self.loaded = true;
        self
    }

    /// Finish configuration and start tracking.
    pub fn build(self) -> TrackResult<Tracked<M>> {
        let record = if self.loaded {
            DirtyRecord::loaded(M::FIELDS)
        } else {
            match &self.supplied {
                Some(fields) => DirtyRecord::created(M::FIELDS, fields.iter().map(String::as_str))?,
                None => DirtyRecord::created_all(M::FIELDS),
            }
        };
        let hooks = self.hooks.or_else(M::class_hooks);
        Ok(Tracked::assemble(
            self.model,
            record,
            hooks,
            self.persister,
            self.config,
        ))
    }
}
