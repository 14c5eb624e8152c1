use crate::binding::Binding;

/// Capability of a field value to be bound to its owning field.
///
/// Scalars ignore bindings. Tracked containers store the binding and pass
/// it on to any nested values so a mutation anywhere below a field reports
/// that same field.
pub trait Attach {
    /// Bind this value (and everything nested in it) to `binding`.
    fn attach(&mut self, _binding: &Binding) {}

    /// Drop any binding held by this value (and everything nested in it).
    fn detach(&mut self) {}
}

/// A value that reports its own mutations through a [`Binding`].
pub trait TrackedContainer: Attach {
    /// The binding currently installed, if any.
    fn binding(&self) -> Option<&Binding>;

    /// Returns `true` if mutations currently reach an owner.
    fn is_bound(&self) -> bool {
        self.binding().is_some_and(Binding::is_live)
    }
}

/// Implement [`Attach`] as a no-op for types that never hold containers.
///
/// ```
/// #[derive(Clone, PartialEq)]
/// struct Priority(u8);
/// dirtrack_containers::attach_scalar!(Priority);
/// ```
#[macro_export]
macro_rules! attach_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::Attach for $ty {})+
    };
}

attach_scalar!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, &'static str, ()
);

impl<T: Attach> Attach for Option<T> {
    fn attach(&mut self, binding: &Binding) {
        if let Some(value) = self {
            value.attach(binding);
        }
    }

    fn detach(&mut self) {
        if let Some(value) = self {
            value.detach();
        }
    }
}

impl<T: Attach> Attach for Box<T> {
    fn attach(&mut self, binding: &Binding) {
        (**self).attach(binding);
    }

    fn detach(&mut self) {
        (**self).detach();
    }
}

impl<A: Attach, B: Attach> Attach for (A, B) {
    fn attach(&mut self, binding: &Binding) {
        self.0.attach(binding);
        self.1.attach(binding);
    }

    fn detach(&mut self) {
        self.0.detach();
        self.1.detach();
    }
}
