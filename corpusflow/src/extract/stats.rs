//! Structural statistics over cleaned text.

use crate::utils::{round_to, static_regex};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| static_regex(r"[.!?]+"));
static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| static_regex(r"\n\s*\n"));

/// Counts describing one document's text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStatistics {
    /// Whitespace-delimited words.
    pub word_count: usize,
    /// Segments between runs of `.`, `!`, `?`.
    pub sentence_count: usize,
    /// Segments between blank lines.
    pub paragraph_count: usize,
    /// Mean characters per word, rounded to 2 places; `0.0` without words.
    pub avg_word_length: f64,
}

/// Computes [`TextStatistics`] for `text`.
#[must_use]
pub fn count_statistics(text: &str) -> TextStatistics {
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();
    let avg_word_length = if word_count == 0 {
        0.0
    } else {
        let chars: usize = words.iter().map(|w| w.chars().count()).sum();
        round_to(chars as f64 / word_count as f64, 2)
    };

    TextStatistics {
        word_count,
        sentence_count: count_sentences(text),
        paragraph_count: count_paragraphs(text),
        avg_word_length,
    }
}

/// Counts non-empty segments split on runs of sentence-ending punctuation.
#[must_use]
pub fn count_sentences(text: &str) -> usize {
    count_segments(&SENTENCE_BREAK, text)
}

/// Counts non-empty segments split on blank lines.
#[must_use]
pub fn count_paragraphs(text: &str) -> usize {
    count_segments(&PARAGRAPH_BREAK, text)
}

fn count_segments(separator: &Regex, text: &str) -> usize {
    separator
        .split(text)
        .filter(|segment| !segment.trim().is_empty())
        .count()
}
