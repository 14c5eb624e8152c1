//! Change hooks.
//!
//! `onchange` runs before a field assignment is committed and may veto it by
//! returning `Ok(false)`. `onchanged` runs after the commit and only observes.
//! Errors from either are handed back to the caller of the assignment.
//!
//! In-place container mutations do not go through either hook; they only
//! mark their field dirty.

use dirtrack_types::{FieldName, HookError};
use serde_json::Value;

/// Pre- and post-change callbacks for a model `M`.
pub trait ChangeHooks<M> {
    /// Called before `field` is set to `value`. Return `Ok(false)` to veto.
    fn onchange(&self, _model: &M, _field: FieldName, _value: &Value) -> Result<bool, HookError> {
        Ok(true)
    }

    /// Called after `field` was changed away from `old`.
    fn onchanged(&self, _model: &M, _field: FieldName, _old: &Value) -> Result<(), HookError> {
        Ok(())
    }
}

type OnChange<M> = Box<dyn Fn(&M, FieldName, &Value) -> Result<bool, HookError>>;
type OnChanged<M> = Box<dyn Fn(&M, FieldName, &Value) -> Result<(), HookError>>;

/// [`ChangeHooks`] assembled from closures. Missing callbacks accept/ignore.
///
/// ```
/// use dirtrack_tracker::{ChangeHooks, HookFns};
///
/// let hooks = HookFns::<()>::new().on_change(|_, field, _| Ok(field != "status"));
/// assert!(!hooks.onchange(&(), "status", &serde_json::Value::Null).unwrap());
/// ```
pub struct HookFns<M> {
    onchange: Option<OnChange<M>>,
    onchanged: Option<OnChanged<M>>,
}

impl<M> HookFns<M> {
    /// Hooks with no callbacks.
    pub fn new() -> Self {
        Self {
            onchange: None,
            onchanged: None,
        }
    }

    /// Install the pre-change callback.
    pub fn on_change<F>(mut self, hook: F) -> Self
    where
        F: Fn(&M, FieldName, &Value) -> Result<bool, HookError> + 'static,
    {
        self.onchange = Some(Box::new(hook));
        self
    }

    /// Install the post-change callback.
    pub fn on_changed<F>(mut self, hook: F) -> Self
    where
        F: Fn(&M, FieldName, &Value) -> Result<(), HookError> + 'static,
    {
        self.onchanged = Some(Box::new(hook));
        self
    }
}

impl<M> Default for HookFns<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> ChangeHooks<M> for HookFns<M> {
    fn onchange(&self, model: &M, field: FieldName, value: &Value) -> Result<bool, HookError> {
        match &self.onchange {
            Some(hook) => hook(model, field, value),
            None => Ok(true),
        }
    }

    fn onchanged(&self, model: &M, field: FieldName, old: &Value) -> Result<(), HookError> {
        match &self.onchanged {
            Some(hook) => hook(model, field, old),
            None => Ok(()),
        }
    }
}

impl<M> std::fmt::Debug for HookFns<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookFns")
            .field("onchange", &self.onchange.is_some())
            .field("onchanged", &self.onchanged.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Accepting;
    impl ChangeHooks<()> for Accepting {}

    #[test]
    fn default_methods_accept() {
        assert!(Accepting.onchange(&(), "x", &Value::Null).unwrap());
        Accepting.onchanged(&(), "x", &Value::Null).unwrap();
    }

    #[test]
    fn empty_hook_fns_accept() {
        let hooks = HookFns::<()>::default();
        assert!(hooks.onchange(&(), "x", &Value::Null).unwrap());
        hooks.onchanged(&(), "x", &Value::Null).unwrap();
        assert_eq!(
            format!("{hooks:?}"),
            "HookFns { onchange: false, onchanged: false }"
        );
    }

    #[test]
    fn closures_are_called() {
        let hooks = HookFns::<i32>::new()
            .on_change(|model, _, value| Ok(value.as_i64() != Some(i64::from(*model))))
            .on_changed(|_, field, _| Err(HookError::new(format!("{field} observed"))));

        assert!(!hooks.onchange(&3, "n", &Value::from(3)).unwrap());
        assert!(hooks.onchange(&3, "n", &Value::from(4)).unwrap());
        let err = hooks.onchanged(&3, "n", &Value::Null).unwrap_err();
        assert_eq!(err.message(), "n observed");
    }
}
