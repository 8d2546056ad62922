//! The stage coordination protocol.
//!
//! Every stage follows the same discipline:
//!
//! 1. Create its own output directories (fatal on failure).
//! 2. Wait for the upstream completion record. Absence is not an error.
//! 3. Handle every listed item, isolating per-item failures.
//! 4. Write its own outputs, then its completion record last and atomically.
//!
//! A stage killed mid-run leaves no completion record, so downstream stages
//! keep waiting instead of consuming partial output.

mod layout;
mod record;
mod wait;

#[cfg(test)]
mod integration_tests;

pub use layout::{processed_name, StorageLayout};
pub use record::{
    DocumentCounts, FetchItem, FetchRecord, ItemOutcome, ProcessItem, ProcessRecord,
    StageCompletionRecord,
};
pub use wait::{
    completion_channel, ChannelWaiter, CompletionNotifier, CompletionWaiter, PollConfig,
    PollingWaiter,
};
