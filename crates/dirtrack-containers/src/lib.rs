//! Mutation-propagating containers for dirtrack.
//!
//! The three wrappers in this crate behave like the std collections they
//! wrap for every read, and report "my owning field changed" once per call
//! to every operation that can alter their contents.
//!
//! # Containers
//!
//! - [`TrackedVec`] -- ordered sequence over `Vec<T>`
//! - [`TrackedMap`] -- key-ordered mapping over `BTreeMap<K, V>`
//! - [`TrackedSet`] -- ordered unique-element set over `BTreeSet<T>`
//!
//! # Binding
//!
//! A container reports through a [`Binding`]: a weak reference to the
//! owner's [`DirtyRecord`](dirtrack_types::DirtyRecord) plus the owning field
//! name. Bindings are handed out by a [`Binder`] and installed with
//! [`Attach::attach`].
//!
//! # Rules
//!
//! 1. A container without a binding is a plain container with no side effects.
//! 2. Reads never report.
//! 3. Every mutating call reports exactly once, even when it changes nothing.
//! 4. Nested containers bind to the same top-level field as their parent.
//! 5. Clones, new sets produced by algebra, and values handed back to the
//!    caller (popped, removed, replaced) are unbound.
//! 6. Bindings are weak: once the owner is gone, reporting is a no-op.

pub mod attach;
pub mod binding;
pub mod map;
pub mod set;
pub mod vec;

pub use attach::{Attach, TrackedContainer};
pub use binding::{Binder, Binding, SharedRecord};
pub use map::TrackedMap;
pub use set::TrackedSet;
pub use vec::TrackedVec;
