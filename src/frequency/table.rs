// Frequency table: occurrence count and containing sentences per token.
//
// Insertion order is tracked alongside the map so that ranking is
// reproducible: ties in count keep the order in which the tokens were first
// seen in the document.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

/// Position of a sentence within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SentenceRef {
    pub paragraph: usize,
    pub sentence: usize,
}

/// Everything recorded about one token.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenStats {
    /// Total occurrences across the document
    pub count: u64,
    /// Sentences the token appears in, in document order
    pub sentences: BTreeSet<SentenceRef>,
}

/// A ranked row of the table, as printed or exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedToken {
    pub token: String,
    pub count: u64,
    pub sentence_count: usize,
}

/// Running count of tokens over a document.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    stats: HashMap<String, TokenStats>,
    order: Vec<String>,
    total: u64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `token` in the given sentence.
    pub fn record(&mut self, token: &str, sentence: SentenceRef) {
        if !self.stats.contains_key(token) {
            self.order.push(token.to_string());
        }
        let stats = self.stats.entry(token.to_string()).or_default();
        stats.count += 1;
        stats.sentences.insert(sentence);
        self.total += 1;
    }

    pub fn get(&self, token: &str) -> Option<&TokenStats> {
        self.stats.get(token)
    }

    /// Occurrences of `token`, zero if never seen.
    pub fn count(&self, token: &str) -> u64 {
        self.stats.get(token).map(|s| s.count).unwrap_or(0)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of recorded occurrences.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Distinct tokens in first-seen order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// All tokens sorted by descending count. The sort is stable, so ties
    /// stay in first-seen order.
    pub fn ranked(&self) -> Vec<RankedToken> {
        self.ranked_filtered(|_| true)
    }

    /// Like [`ranked`](Self::ranked), leaving out the given stop words.
    pub fn ranked_excluding(&self, stop_words: &HashSet<String>) -> Vec<RankedToken> {
        self.ranked_filtered(|token| !stop_words.contains(token))
    }

    fn ranked_filtered(&self, keep: impl Fn(&str) -> bool) -> Vec<RankedToken> {
        let mut rows: Vec<RankedToken> = self
            .order
            .iter()
            .filter(|token| keep(token.as_str()))
            .map(|token| {
                let stats = &self.stats[token];
                RankedToken {
                    token: token.clone(),
                    count: stats.count,
                    sentence_count: stats.sentences.len(),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows
    }
}
