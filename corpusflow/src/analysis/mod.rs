//! Corpus analytics: tokenization, n-grams, frequency rankings, pairwise
//! similarity and readability, plus the analyzer stage that drives them.

mod analyzer;
mod corpus;
mod frequency;
mod readability;
mod report;
mod similarity;
mod tokenize;

pub use analyzer::CorpusAnalyzer;
pub use corpus::{analyze_corpus, CorpusDocument};
pub use frequency::FrequencyTable;
pub use readability::{count_syllables, ReadabilityMetrics, ReadabilityTally};
pub use report::{BigramCount, CorpusAnalysis, TrigramCount, WordFrequency};
pub use similarity::{jaccard_similarity, pairwise_similarities, DocumentSimilarity};
pub use tokenize::{extract_ngrams, tokenize_text};
