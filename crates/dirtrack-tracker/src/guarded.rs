//! Guarded save adapter.
//!
//! Wraps a host-provided persistence action so that it only runs when the
//! target has something to persist, and resets the target's state only when
//! the action succeeds.

use tracing::debug;

use crate::model::Model;
use crate::persist::SaveOutcome;
use crate::tracked::Tracked;

/// A persistence action behind the save guard.
///
/// ```
/// use dirtrack_tracker::{guarded, Binder, Model, SaveOutcome, Tracked};
///
/// #[derive(serde::Serialize)]
/// struct Counter {
///     hits: u32,
/// }
///
/// impl Model for Counter {
///     const FIELDS: &'static [&'static str] = &["hits"];
///     fn attach(&mut self, _binder: &Binder) {}
/// }
///
/// let mut writes = Vec::new();
/// let mut save = guarded(|model: &Counter, tag: &str| -> Result<usize, String> {
///     writes.push(format!("{tag}:{}", model.hits));
///     Ok(writes.len())
/// });
///
/// let mut counter = Tracked::new(Counter { hits: 3 });
/// assert_eq!(save.call(&mut counter, "first", false), Ok(SaveOutcome::Saved(1)));
/// assert_eq!(save.call(&mut counter, "again", false), Ok(SaveOutcome::Skipped));
/// ```
pub struct GuardedSave<F> {
    action: F,
}

/// Wrap `action` in a [`GuardedSave`].
pub fn guarded<F>(action: F) -> GuardedSave<F> {
    GuardedSave::new(action)
}

impl<F> GuardedSave<F> {
    /// Wrap `action`.
    pub fn new(action: F) -> Self {
        Self { action }
    }

    /// Unwrap the action.
    pub fn into_inner(self) -> F {
        self.action
    }

    /// Run the action on `target` if it is new, dirty, or `force` is set.
    ///
    /// On success the action's result is returned and `target` becomes not
    /// new and clean. An error from the action is returned unchanged and
    /// `target` keeps its state.
    pub fn call<M, A, R, E>(
        &mut self,
        target: &mut Tracked<M>,
        args: A,
        force: bool,
    ) -> Result<SaveOutcome<R>, E>
    where
        M: Model,
        F: FnMut(&M, A) -> Result<R, E>,
    {
        if !target.should_save(force) {
            debug!("guarded save skipped: instance is clean");
            return Ok(SaveOutcome::Skipped);
        }
        let result = (self.action)(target.model(), args)?;
        target.mark_saved();
        Ok(SaveOutcome::Saved(result))
    }
}

impl<F> std::fmt::Debug for GuardedSave<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedSave").finish_non_exhaustive()
    }
}
