//! Corpus-wide aggregation over loaded documents.

use super::frequency::FrequencyTable;
use super::readability::ReadabilityTally;
use super::report::{BigramCount, CorpusAnalysis, TrigramCount, WordFrequency};
use super::similarity::pairwise_similarities;
use super::tokenize::{extract_ngrams, tokenize_text};
use crate::config::AnalysisConfig;
use crate::utils::{now_utc, round_to};
use std::collections::HashSet;

/// One document as the analyzer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusDocument {
    /// Name used in similarity entries (the processed file name).
    pub name: String,
    /// Cleaned text.
    pub text: String,
}

impl CorpusDocument {
    /// Creates a corpus document.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Computes the full report for `documents`, in the given order.
#[must_use]
pub fn analyze_corpus(documents: &[CorpusDocument], config: &AnalysisConfig) -> CorpusAnalysis {
    let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize_text(&d.text)).collect();

    let mut words = FrequencyTable::new();
    let mut bigrams = FrequencyTable::new();
    let mut trigrams = FrequencyTable::new();
    let mut readability = ReadabilityTally::default();

    for (document, tokens) in documents.iter().zip(&tokenized) {
        words.extend(tokens);
        bigrams.extend(extract_ngrams(tokens, 2));
        trigrams.extend(extract_ngrams(tokens, 3));
        readability.add(&document.text, tokens);
    }

    let token_sets: Vec<(&str, HashSet<&str>)> = documents
        .iter()
        .zip(&tokenized)
        .map(|(document, tokens)| {
            (
                document.name.as_str(),
                tokens.iter().map(String::as_str).collect(),
            )
        })
        .collect();

    let total_words = words.total();
    let top_words = words
        .most_common(config.top_words)
        .into_iter()
        .map(|(word, count)| WordFrequency {
            word: word.to_string(),
            count,
            frequency: if total_words == 0 {
                0.0
            } else {
                round_to(count as f64 / total_words as f64, 4)
            },
        })
        .collect();

    CorpusAnalysis {
        processing_timestamp: now_utc(),
        documents_processed: documents.len(),
        total_words,
        unique_words: words.len(),
        top_words,
        document_similarity: pairwise_similarities(&token_sets),
        top_bigrams: bigrams
            .most_common(config.top_bigrams)
            .into_iter()
            .map(|(bigram, count)| BigramCount {
                bigram: bigram.to_string(),
                count,
            })
            .collect(),
        top_trigrams: trigrams
            .most_common(config.top_trigrams)
            .into_iter()
            .map(|(trigram, count)| TrigramCount {
                trigram: trigram.to_string(),
                count,
            })
            .collect(),
        readability: readability.finish(),
    }
}
