//! Counting tokens and n-grams.

use std::collections::HashMap;

/// Occurrence counts that remember first-seen order.
///
/// [`most_common`](Self::most_common) ranks by count, and equal counts keep
/// the order in which keys were first added, so rankings are reproducible
/// across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
    total: usize,
}

impl FrequencyTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `key`.
    pub fn add(&mut self, key: &str) {
        self.total += 1;
        if let Some(&slot) = self.index.get(key) {
            self.entries[slot].1 += 1;
            return;
        }
        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push((key.to_string(), 1));
    }

    /// Occurrences of `key`.
    #[must_use]
    pub fn count(&self, key: &str) -> usize {
        self.index.get(key).map_or(0, |&slot| self.entries[slot].1)
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `k` highest counts, ties broken by first appearance.
    #[must_use]
    pub fn most_common(&self, k: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<&(String, usize)> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(k)
            .map(|(key, count)| (key.as_str(), *count))
            .collect()
    }
}

impl<S: AsRef<str>> Extend<S> for FrequencyTable {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for key in iter {
            self.add(key.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}
