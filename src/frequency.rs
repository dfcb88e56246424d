//! Unigram/digram frequency model of target symbols.
//!
//! Built once from a whitespace-delimited word corpus and immutable
//! afterwards. Characters that are not already known target symbols are
//! slack: they are skipped and never interned.

use std::collections::BTreeMap;
use tracing::info;

use crate::types::{SymbolTable, TargetId};

/// Normalized occurrence statistics of target symbols.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyModel {
    unigram: BTreeMap<TargetId, f64>,
    digram: BTreeMap<(TargetId, TargetId), f64>,
    unigram_total: u64,
    digram_total: u64,
}

impl FrequencyModel {
    /// Build a model by scanning a corpus against the known targets.
    pub fn from_corpus(corpus: &str, targets: &SymbolTable<TargetId>) -> Self {
        let mut counter = FrequencyCounter::new();
        for word in corpus.split_whitespace() {
            counter.observe_word(word, targets);
        }
        let model = counter.finish();

        info!(
            unigrams = model.unigram_total,
            digrams = model.digram_total,
            distinct_targets = model.unigram.len(),
            "Processed word list"
        );
        model
    }

    /// Probability of a target, 0 if never observed.
    pub fn unigram_probability(&self, target: TargetId) -> f64 {
        self.unigram.get(&target).copied().unwrap_or(0.0)
    }

    /// Probability of the ordered pair `(first, second)`, 0 if never observed.
    pub fn digram_probability(&self, first: TargetId, second: TargetId) -> f64 {
        self.digram.get(&(first, second)).copied().unwrap_or(0.0)
    }

    /// Unigram table over observed targets.
    pub fn unigrams(&self) -> &BTreeMap<TargetId, f64> {
        &self.unigram
    }

    /// Digram table over observed ordered pairs.
    pub fn digrams(&self) -> &BTreeMap<(TargetId, TargetId), f64> {
        &self.digram
    }

    /// Number of in-vocabulary character occurrences seen.
    pub fn unigram_total(&self) -> u64 {
        self.unigram_total
    }

    /// Number of digram occurrences seen.
    pub fn digram_total(&self) -> u64 {
        self.digram_total
    }

    /// Whether no in-vocabulary occurrence was seen.
    pub fn is_empty(&self) -> bool {
        self.unigram_total == 0
    }
}

/// Raw occurrence counter, normalized into a [`FrequencyModel`] by `finish`.
#[derive(Debug, Clone, Default)]
pub struct FrequencyCounter {
    unigram: BTreeMap<TargetId, u64>,
    digram: BTreeMap<(TargetId, TargetId), u64>,
    unigram_total: u64,
    digram_total: u64,
}

impl FrequencyCounter {
    /// Create a counter with zeroed totals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one word.
    ///
    /// Digrams pair each in-vocabulary character with the nearest preceding
    /// in-vocabulary character of the same word.
    pub fn observe_word(&mut self, word: &str, targets: &SymbolTable<TargetId>) {
        let mut prev: Option<TargetId> = None;
        for c in word.chars() {
            let Some(current) = targets.find_char(c) else {
                continue;
            };

            *self.unigram.entry(current).or_default() += 1;
            self.unigram_total += 1;

            if let Some(p) = prev {
                *self.digram.entry((p, current)).or_default() += 1;
                self.digram_total += 1;
            }
            prev = Some(current);
        }
    }

    /// Normalize counts by their totals.
    ///
    /// Empty counts produce empty tables.
    pub fn finish(self) -> FrequencyModel {
        let unigram_z = self.unigram_total as f64;
        let digram_z = self.digram_total as f64;

        FrequencyModel {
            unigram: self
                .unigram
                .into_iter()
                .map(|(t, n)| (t, n as f64 / unigram_z))
                .collect(),
            digram: self
                .digram
                .into_iter()
                .map(|(pair, n)| (pair, n as f64 / digram_z))
                .collect(),
            unigram_total: self.unigram_total,
            digram_total: self.digram_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab_targets() -> (SymbolTable<TargetId>, TargetId, TargetId) {
        let mut targets = SymbolTable::new();
        let a = targets.add("a");
        let b = targets.add("b");
        (targets, a, b)
    }

    #[test]
    fn test_unigram_and_digram_probabilities() {
        let (targets, a, b) = ab_targets();
        let model = FrequencyModel::from_corpus("aab", &targets);

        assert!((model.unigram_probability(a) - 2.0 / 3.0).abs() < 1e-12);
        assert!((model.unigram_probability(b) - 1.0 / 3.0).abs() < 1e-12);
        assert!((model.digram_probability(a, a) - 0.5).abs() < 1e-12);
        assert!((model.digram_probability(a, b) - 0.5).abs() < 1e-12);
        assert_eq!(model.digram_probability(b, a), 0.0);
    }

    #[test]
    fn test_previous_pointer_advances_every_character() {
        let (targets, a, b) = ab_targets();
        let model = FrequencyModel::from_corpus("abab", &targets);

        // a->b, b->a, a->b
        assert_eq!(model.digram_total(), 3);
        assert!((model.digram_probability(a, b) - 2.0 / 3.0).abs() < 1e-12);
        assert!((model.digram_probability(b, a) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_slack_characters_are_skipped() {
        let (targets, a, b) = ab_targets();
        let model = FrequencyModel::from_corpus("a-x-b", &targets);

        assert_eq!(model.unigram_total(), 2);
        // Slack does not break the chain within a word
        assert_eq!(model.digram_probability(a, b), 1.0);
        assert!(targets.find("x").is_none());
    }

    #[test]
    fn test_digrams_do_not_cross_words() {
        let (targets, a, b) = ab_targets();
        let model = FrequencyModel::from_corpus("a b", &targets);

        assert_eq!(model.digram_total(), 0);
        assert!(model.digrams().is_empty());
        assert_eq!(model.digram_probability(a, b), 0.0);
    }

    #[test]
    fn test_empty_corpus_yields_empty_tables() {
        let (targets, a, _) = ab_targets();
        let model = FrequencyModel::from_corpus("xyz qqq", &targets);

        assert!(model.is_empty());
        assert!(model.unigrams().is_empty());
        assert_eq!(model.unigram_probability(a), 0.0);
        assert!(model.unigrams().values().all(|p| !p.is_nan()));
    }

    #[test]
    fn test_unigrams_sum_to_one() {
        let (targets, _, _) = ab_targets();
        let model = FrequencyModel::from_corpus("ab ba aab bba abba", &targets);

        let sum: f64 = model.unigrams().values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        let sum: f64 = model.digrams().values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
