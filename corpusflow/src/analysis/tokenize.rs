//! Corpus tokenizer and n-gram windows.

use crate::utils::static_regex;
use regex::Regex;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> = LazyLock::new(|| static_regex(r"[a-z]+"));

/// Splits text into lower-case words.
///
/// A word is a maximal run of ASCII letters; digits, punctuation and any
/// other character act as boundaries.
///
/// ```
/// use corpusflow::analysis::tokenize_text;
///
/// assert_eq!(tokenize_text("Hello, World! x2y"), vec!["hello", "world", "x", "y"]);
/// ```
#[must_use]
pub fn tokenize_text(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Every contiguous window of `n` tokens, joined by a single space.
///
/// Empty when there are fewer than `n` tokens or `n` is zero.
///
/// ```
/// use corpusflow::analysis::extract_ngrams;
///
/// assert_eq!(extract_ngrams(&["a", "b", "c"], 2), vec!["a b", "b c"]);
/// assert!(extract_ngrams(&["a"], 2).is_empty());
/// ```
#[must_use]
pub fn extract_ngrams<S: AsRef<str>>(tokens: &[S], n: usize) -> Vec<String> {
    if n == 0 || tokens.len() < n {
        return Vec::new();
    }
    tokens
        .windows(n)
        .map(|window| {
            window
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize_text("The QUICK brown-fox's tail."),
            vec!["the", "quick", "brown", "fox", "s", "tail"]
        );
    }

    #[test]
    fn test_tokenize_digits_are_boundaries() {
        assert_eq!(tokenize_text("abc123def 42 x"), vec!["abc", "def", "x"]);
        assert!(tokenize_text("2024 ... !!!").is_empty());
    }

    #[test]
    fn test_tokenize_non_ascii_letters_are_boundaries() {
        assert_eq!(tokenize_text("Café naïve"), vec!["caf", "na", "ve"]);
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let text = "one two three two one";
        assert_eq!(tokenize_text(text), tokenize_text(text));
    }

    #[test]
    fn test_bigrams_and_trigrams() {
        let tokens = tokenize_text("a b c d");
        assert_eq!(extract_ngrams(&tokens, 2), vec!["a b", "b c", "c d"]);
        assert_eq!(extract_ngrams(&tokens, 3), vec!["a b c", "b c d"]);
        assert_eq!(extract_ngrams(&tokens, 4), vec!["a b c d"]);
    }

    #[test]
    fn test_ngrams_short_input() {
        assert!(extract_ngrams(&["a"], 2).is_empty());
        assert!(extract_ngrams::<&str>(&[], 1).is_empty());
        assert!(extract_ngrams(&["a", "b"], 0).is_empty());
        assert_eq!(extract_ngrams(&["a", "b"], 1), vec!["a", "b"]);
    }
}
