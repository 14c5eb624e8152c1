use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a tracked instance.
///
/// ```text
///   Created  --change-->     Modified
///   Created  --save/clear--> Loaded
///   Modified --save/clear--> Loaded
///   Loaded   --change-->     Modified
/// ```
///
/// `Destroyed` is terminal and is only observed through a container binding
/// whose owner has gone away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Freshly constructed; dirty fields are the construction baseline.
    Created,
    /// At least one change was accepted since construction or the last reset.
    Modified,
    /// Clean: saved, explicitly cleared, or read back from storage.
    Loaded,
    /// The owning instance no longer exists.
    Destroyed,
}

impl Lifecycle {
    /// Returns `true` for states that may still receive changes.
    pub fn is_live(self) -> bool {
        !matches!(self, Self::Destroyed)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Loaded => "loaded",
            Self::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}
