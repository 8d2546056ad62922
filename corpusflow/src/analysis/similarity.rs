//! Jaccard similarity between documents.

use crate::utils::round_to;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;

/// Similarity of one unordered document pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSimilarity {
    /// Earlier document in load order.
    pub doc_a: String,
    /// Later document in load order.
    pub doc_b: String,
    /// Jaccard index rounded to 4 places.
    pub similarity: f64,
}

/// `|a ∩ b| / |a ∪ b|`, or `0.0` when both sets are empty.
#[must_use]
pub fn jaccard_similarity<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Similarity for every pair `(i, j)` with `i < j`, in that order.
///
/// Quadratic in the number of documents.
#[must_use]
pub fn pairwise_similarities<N, T>(documents: &[(N, HashSet<T>)]) -> Vec<DocumentSimilarity>
where
    N: AsRef<str>,
    T: Eq + Hash,
{
    let n = documents.len();
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for (i, (name_a, set_a)) in documents.iter().enumerate() {
        for (name_b, set_b) in &documents[i + 1..] {
            pairs.push(DocumentSimilarity {
                doc_a: name_a.as_ref().to_string(),
                doc_b: name_b.as_ref().to_string(),
                similarity: round_to(jaccard_similarity(set_a, set_b), 4),
            });
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set<'a>(words: &[&'a str]) -> HashSet<&'a str> {
        words.iter().copied().collect()
    }

    #[test]
    fn test_jaccard_basic_cases() {
        let ab = set(&["a", "b"]);
        let ac = set(&["a", "c"]);
        let xy = set(&["x", "y"]);

        assert!((jaccard_similarity(&ab, &ac) - 1.0 / 3.0).abs() < 1e-12);
        assert!((jaccard_similarity(&ab, &ab) - 1.0).abs() < f64::EPSILON);
        assert!(jaccard_similarity(&ab, &xy).abs() < f64::EPSILON);
        assert!(jaccard_similarity(&set(&[]), &set(&[])).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_symmetric() {
        let a = set(&["one", "two", "three"]);
        let b = set(&["two", "three", "four", "five"]);
        assert!((jaccard_similarity(&a, &b) - jaccard_similarity(&b, &a)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pair_count_and_order() {
        let docs: Vec<(String, HashSet<&str>)> = (0..5)
            .map(|i| (format!("d{i}.json"), set(&["w"])))
            .collect();
        let pairs = pairwise_similarities(&docs);
        assert_eq!(pairs.len(), 10);
        assert_eq!(pairs[0].doc_a, "d0.json");
        assert_eq!(pairs[0].doc_b, "d1.json");
        assert_eq!(pairs[9].doc_a, "d3.json");
        assert_eq!(pairs[9].doc_b, "d4.json");
    }

    #[test]
    fn test_fewer_than_two_documents() {
        let none: Vec<(&str, HashSet<&str>)> = Vec::new();
        assert!(pairwise_similarities(&none).is_empty());
        assert!(pairwise_similarities(&[("only", set(&["a"]))]).is_empty());
    }

    #[test]
    fn test_similarity_rounded() {
        let pairs = pairwise_similarities(&[("a", set(&["a", "b"])), ("b", set(&["a", "c"]))]);
        assert!((pairs[0].similarity - 0.3333).abs() < f64::EPSILON);
    }
}
