//! Item status and stage kind enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The pipeline stage a record or artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Retrieves raw documents. External to this crate.
    Fetch,
    /// Turns raw HTML into processed documents.
    Process,
    /// Computes corpus-wide analytics.
    Analyze,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Process => write!(f, "process"),
            Self::Analyze => write!(f, "analyze"),
        }
    }
}

/// Outcome of one document within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// The item's output artifact exists and is fully written.
    Success,
    /// The item produced no output artifact.
    Failed,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl ItemStatus {
    /// Returns true if the status indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
