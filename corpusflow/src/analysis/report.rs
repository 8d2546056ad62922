//! The final report written by the analyzer.

use super::readability::ReadabilityMetrics;
use super::similarity::DocumentSimilarity;
use crate::utils::timestamps::{self, Timestamp};
use serde::{Deserialize, Serialize};

/// Corpus-wide analysis of every loaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusAnalysis {
    /// When the report was computed.
    #[serde(with = "timestamps::iso8601")]
    pub processing_timestamp: Timestamp,
    /// Documents that loaded and contributed to every aggregate below.
    pub documents_processed: usize,
    /// Tokens across the corpus.
    pub total_words: usize,
    /// Distinct tokens across the corpus.
    pub unique_words: usize,
    /// Most frequent tokens.
    pub top_words: Vec<WordFrequency>,
    /// One entry per unordered document pair.
    pub document_similarity: Vec<DocumentSimilarity>,
    /// Most frequent bigrams.
    pub top_bigrams: Vec<BigramCount>,
    /// Most frequent trigrams.
    pub top_trigrams: Vec<TrigramCount>,
    /// Pooled readability.
    pub readability: ReadabilityMetrics,
}

/// A ranked token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordFrequency {
    /// The token.
    pub word: String,
    /// Occurrences.
    pub count: usize,
    /// `count / total_words`, rounded to 4 places.
    pub frequency: f64,
}

/// A ranked bigram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigramCount {
    /// Two tokens joined by a space.
    pub bigram: String,
    /// Occurrences.
    pub count: usize,
}

/// A ranked trigram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrigramCount {
    /// Three tokens joined by a space.
    pub trigram: String,
    /// Occurrences.
    pub count: usize,
}
