//! Host model capability contract.

use std::fmt;
use std::rc::Rc;

use dirtrack_containers::{Attach, Binder};
use dirtrack_types::FieldName;
use serde::Serialize;

use crate::hooks::ChangeHooks;

/// A host object whose fields are tracked.
///
/// The host declares its field names and binds its container fields; the
/// tracker does everything else. Field values are read and written through
/// [`Field`] descriptors.
pub trait Model: Serialize + Sized + 'static {
    /// Every declared field name.
    const FIELDS: &'static [FieldName];

    /// Bind every container-typed field with `binder.bind(<field name>)`.
    ///
    /// Scalar fields may be skipped; binding them is a no-op.
    fn attach(&mut self, binder: &Binder);

    /// Hooks shared by every instance of this model.
    ///
    /// Consulted once, when a tracker is built without instance hooks.
    fn class_hooks() -> Option<Rc<dyn ChangeHooks<Self>>> {
        None
    }
}

/// A value that can live in a tracked field.
///
/// Equality decides whether an assignment is a change, serialization feeds
/// hooks and snapshots, and [`Attach`] binds containers to their field.
pub trait FieldValue: PartialEq + Serialize + Attach {}

impl<T: PartialEq + Serialize + Attach> FieldValue for T {}

/// Typed descriptor of one declared field of `M`.
///
/// Usually declared as an associated constant with [`field!`](crate::field):
///
/// ```
/// use dirtrack_tracker::{field, Field};
///
/// #[derive(serde::Serialize)]
/// struct Ticket {
///     status: String,
/// }
///
/// impl Ticket {
///     const STATUS: Field<Ticket, String> = field!(Ticket, status);
/// }
///
/// assert_eq!(Ticket::STATUS.name(), "status");
/// ```
pub struct Field<M, T> {
    name: FieldName,
    get: fn(&M) -> &T,
    get_mut: fn(&mut M) -> &mut T,
}

impl<M, T> Field<M, T> {
    /// Describe the field `name` with its accessors.
    pub const fn new(name: FieldName, get: fn(&M) -> &T, get_mut: fn(&mut M) -> &mut T) -> Self {
        Self { name, get, get_mut }
    }

    /// The declared field name.
    pub fn name(&self) -> FieldName {
        self.name
    }

    /// Read the field from `model`.
    pub fn get<'m>(&self, model: &'m M) -> &'m T {
        (self.get)(model)
    }

    pub(crate) fn get_mut<'m>(&self, model: &'m mut M) -> &'m mut T {
        (self.get_mut)(model)
    }
}

impl<M, T> Clone for Field<M, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, T> Copy for Field<M, T> {}

impl<M, T> fmt::Debug for Field<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// Build a [`Field`] descriptor for `$model.$name`.
#[macro_export]
macro_rules! field {
    ($model:ty, $name:ident) => {
        $crate::Field::<$model, _>::new(
            ::core::stringify!($name),
            |model: &$model| &model.$name,
            |model: &mut $model| &mut model.$name,
        )
    };
}
