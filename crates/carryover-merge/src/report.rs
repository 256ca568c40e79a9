//! Diagnostics collected during a merge.
//!
//! The report records scalar disagreements that no rule governed. The new
//! value always wins in that case; the report exists so callers can see what
//! was overridden. It never influences the merged document.

use std::fmt;

use serde_json::Value;

/// Scalar disagreements observed during one merge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeReport {
    mismatches: Vec<ValueMismatch>,
}

impl MergeReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no mismatches were recorded.
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Number of recorded mismatches.
    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    /// Recorded mismatches in visit order.
    pub fn mismatches(&self) -> &[ValueMismatch] {
        &self.mismatches
    }

    pub(crate) fn record(&mut self, mismatch: ValueMismatch) {
        self.mismatches.push(mismatch);
    }
}

/// A scalar key where old and new disagreed and the new value was kept.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueMismatch {
    /// Dot-joined path of the key.
    pub path: String,
    /// Value in the old document.
    pub old: Value,
    /// Value in the new document (kept).
    pub new: Value,
}

impl fmt::Display for ValueMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}': old={}, new={} (keeping new value)",
            self.path, self.old, self.new
        )
    }
}
