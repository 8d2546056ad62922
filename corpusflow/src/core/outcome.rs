//! What a stage run reports back to its caller.

use std::fmt;

/// Result of a stage run that did not hit a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage drained its input and wrote its output.
    Completed {
        /// Items the stage attempted.
        items_total: usize,
        /// Items that produced an artifact.
        items_succeeded: usize,
        /// Items that failed.
        items_failed: usize,
    },
    /// The upstream record listed nothing to work on; no output was written.
    NothingToDo,
}

impl StageOutcome {
    /// Creates a completed outcome.
    #[must_use]
    pub fn completed(items_succeeded: usize, items_failed: usize) -> Self {
        Self::Completed {
            items_total: items_succeeded + items_failed,
            items_succeeded,
            items_failed,
        }
    }

    /// Returns true if the stage wrote its output.
    #[must_use]
    pub fn wrote_output(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed {
                items_total,
                items_succeeded,
                items_failed,
            } => write!(
                f,
                "{items_succeeded}/{items_total} succeeded, {items_failed} failed"
            ),
            Self::NothingToDo => write!(f, "nothing to do"),
        }
    }
}
