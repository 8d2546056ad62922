//! Corpus readability, a simplified Flesch reading ease.

use crate::extract::count_sentences;
use crate::utils::{round_to, static_regex};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static VOWEL_GROUP: LazyLock<Regex> = LazyLock::new(|| static_regex(r"[aeiouy]+"));

/// Estimated syllables: maximal runs of `[aeiouy]`, at least one.
#[must_use]
pub fn count_syllables(word: &str) -> usize {
    VOWEL_GROUP.find_iter(word).count().max(1)
}

/// Readability pooled over every document of the corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityMetrics {
    /// Tokens per sentence.
    pub avg_sentence_length: f64,
    /// Characters per token.
    pub avg_word_length: f64,
    /// `206.835 - 1.015 * asl - 84.6 * syllables_per_word`, or 0 without text.
    pub complexity_score: f64,
}

/// Running sums behind [`ReadabilityMetrics`].
///
/// Lets the analyzer reuse the tokens it already computed per document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadabilityTally {
    sentences: usize,
    words: usize,
    chars: usize,
    syllables: usize,
}

impl ReadabilityTally {
    /// Adds one document given its text and its tokens.
    pub fn add<S: AsRef<str>>(&mut self, text: &str, tokens: &[S]) {
        self.sentences += count_sentences(text);
        self.words += tokens.len();
        for token in tokens {
            let token = token.as_ref();
            self.chars += token.len();
            self.syllables += count_syllables(token);
        }
    }

    /// Final metrics, each rounded to 2 places.
    #[must_use]
    pub fn finish(&self) -> ReadabilityMetrics {
        let ratio = |num: usize, den: usize| {
            if den == 0 {
                0.0
            } else {
                num as f64 / den as f64
            }
        };
        let avg_sentence_length = ratio(self.words, self.sentences);
        let avg_word_length = ratio(self.chars, self.words);
        let syllables_per_word = ratio(self.syllables, self.words);

        let complexity_score = if avg_sentence_length > 0.0 && syllables_per_word > 0.0 {
            206.835 - 1.015 * avg_sentence_length - 84.6 * syllables_per_word
        } else {
            0.0
        };

        ReadabilityMetrics {
            avg_sentence_length: round_to(avg_sentence_length, 2),
            avg_word_length: round_to(avg_word_length, 2),
            complexity_score: round_to(complexity_score, 2),
        }
    }
}
