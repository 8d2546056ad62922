//! Small shared helpers: timestamps and fixed-precision rounding.

pub mod timestamps;

pub use timestamps::{format_iso8601, now_utc, parse_iso8601, Timestamp};

use regex::Regex;

/// Compiles a pattern that is a string literal in this crate.
pub(crate) fn static_regex(pattern: &str) -> Regex {
    #[allow(clippy::expect_used)]
    Regex::new(pattern).expect("built-in pattern must compile")
}

/// Rounds `value` to `places` decimal places. Exact ties go to the even digit.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}
