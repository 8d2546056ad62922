//! Core domain model types for corpusflow.
//!
//! - Stage kind and per-item status enums
//! - The outcome a stage run reports to its caller

mod outcome;
mod status;

pub use outcome::StageOutcome;
pub use status::{ItemStatus, StageKind};
