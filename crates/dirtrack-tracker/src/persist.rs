use dirtrack_types::PersistError;

/// The host's persistence action for a model `M`.
///
/// Closures of the right shape are persisters too:
///
/// ```
/// use dirtrack_tracker::Persister;
/// use dirtrack_types::PersistError;
///
/// let mut writes = 0;
/// let mut persist = |_: &u32| -> Result<(), PersistError> {
///     writes += 1;
///     Ok(())
/// };
/// persist.persist(&7).unwrap();
/// drop(persist);
/// assert_eq!(writes, 1);
/// ```
pub trait Persister<M> {
    /// Write `model` to storage.
    fn persist(&mut self, model: &M) -> Result<(), PersistError>;
}

impl<M, F> Persister<M> for F
where
    F: FnMut(&M) -> Result<(), PersistError>,
{
    fn persist(&mut self, model: &M) -> Result<(), PersistError> {
        self(model)
    }
}

/// What a save call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome<R = ()> {
    /// Clean, not new, not forced: nothing ran.
    Skipped,
    /// The persistence action ran and succeeded.
    Saved(R),
}

impl<R> SaveOutcome<R> {
    /// Returns `true` if the persistence action ran.
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    /// The action's return value, if it ran.
    pub fn into_saved(self) -> Option<R> {
        match self {
            Self::Saved(value) => Some(value),
            Self::Skipped => None,
        }
    }
}
