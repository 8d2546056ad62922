//! Cooperative cancellation for stage waits.

mod token;

pub use token::CancellationToken;
