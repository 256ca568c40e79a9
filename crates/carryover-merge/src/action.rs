use std::fmt;

use serde::{Deserialize, Serialize};

/// Resolution policy for a key matched by a rule.
///
/// `Custom` carries no handler; the engine looks the handler up separately
/// in the strategy's custom handler table using the key's full path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeAction {
    /// Leave the key as the new document has it (absent stays absent).
    Skip,
    /// Keep the new value.
    KeepNew,
    /// Take the old value.
    KeepOld,
    /// Merge the values (objects recurse, lists union).
    Merge,
    /// Delegate to the custom handler registered for the path.
    Custom,
}

impl fmt::Display for MergeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::KeepNew => write!(f, "keep_new"),
            Self::KeepOld => write!(f, "keep_old"),
            Self::Merge => write!(f, "merge"),
            Self::Custom => write!(f, "custom"),
        }
    }
}
