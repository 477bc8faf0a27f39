//! Pair counting for BPE training.
//!
//! This module holds the two helpers of the training loop: collecting
//! adjacent-pair statistics over a token sequence and rewriting the sequence
//! once a pair has been selected. [`PairCounter`] combines them into the
//! full-rescan engine.

use ahash::RandomState;
use bytepair_core::{Pair, SymbolId};
use indexmap::IndexMap;

/// Adjacent-pair counts in order of first occurrence.
#[derive(Debug, Clone, Default)]
pub struct PairStats {
    counts: IndexMap<Pair, u64, RandomState>,
}

impl PairStats {
    /// Count of `pair`, if it occurs at all.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<u64> {
        self.counts.get(&pair).copied()
    }

    /// The pair with the highest count.
    ///
    /// Among pairs sharing the maximum, the one that occurs first in the
    /// sequence wins.
    pub fn most_frequent(&self) -> Option<(Pair, u64)> {
        let mut best: Option<(Pair, u64)> = None;
        for (&pair, &count) in &self.counts {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((pair, count));
            }
        }
        best
    }

    /// Iterate over `(pair, count)` in order of first occurrence.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, u64)> + '_ {
        self.counts.iter().map(|(&pair, &count)| (pair, count))
    }

    /// Sum of all counts, i.e. the number of adjacent positions.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when the sequence had fewer than two symbols.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Count every adjacent pair in `tokens`.
pub fn count_pairs(tokens: &[SymbolId]) -> PairStats {
    let mut counts = IndexMap::with_hasher(RandomState::new());
    for window in tokens.windows(2) {
        *counts.entry((window[0], window[1])).or_insert(0) += 1;
    }
    PairStats { counts }
}

/// Replace occurrences of `pair` with `new_id`, scanning left to right.
///
/// Matches never overlap: once a position is consumed the scan resumes after
/// it, so `a a a` becomes `X a`. Returns the number of replacements.
pub fn merge_in_place(tokens: &mut Vec<SymbolId>, pair: Pair, new_id: SymbolId) -> usize {
    let len = tokens.len();
    let mut read = 0;
    let mut write = 0;
    let mut merged = 0;

    while read < len {
        if read + 1 < len && tokens[read] == pair.0 && tokens[read + 1] == pair.1 {
            tokens[write] = new_id;
            read += 2;
            merged += 1;
        } else {
            tokens[write] = tokens[read];
            read += 1;
        }
        write += 1;
    }

    tokens.truncate(write);
    merged
}

/// Return a copy of `tokens` with `pair` merged into `new_id`.
pub fn apply_merge(tokens: &[SymbolId], pair: Pair, new_id: SymbolId) -> Vec<SymbolId> {
    let mut out = tokens.to_vec();
    merge_in_place(&mut out, pair, new_id);
    out
}

/// Full-rescan training state: the token sequence, recounted every step.
#[derive(Debug, Clone, Default)]
pub struct PairCounter {
    tokens: Vec<SymbolId>,
}

impl PairCounter {
    /// Start from one base symbol per byte.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            tokens: bytes.iter().map(|&b| SymbolId::from(b)).collect(),
        }
    }

    /// Count all adjacent pairs of the current sequence.
    pub fn count_pairs(&self) -> PairStats {
        count_pairs(&self.tokens)
    }

    /// Merge `pair` everywhere in the current sequence.
    pub fn merge_pair(&mut self, pair: Pair, new_id: SymbolId) -> usize {
        merge_in_place(&mut self.tokens, pair, new_id)
    }

    /// The current token sequence.
    pub fn tokens(&self) -> &[SymbolId] {
        &self.tokens
    }

    /// Consume the counter, returning the token sequence.
    pub fn into_tokens(self) -> Vec<SymbolId> {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_pairs() {
        let stats = count_pairs(&[1, 2, 1, 2, 3]);

        assert_eq!(stats.len(), 3);
        assert_eq!(stats.get((1, 2)), Some(2));
        assert_eq!(stats.get((2, 1)), Some(1));
        assert_eq!(stats.get((2, 3)), Some(1));
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_count_pairs_counts_overlaps() {
        let stats = count_pairs(&[7, 7, 7]);
        assert_eq!(stats.get((7, 7)), Some(2));
    }

    #[test]
    fn test_count_pairs_short_input() {
        assert!(count_pairs(&[]).is_empty());
        assert!(count_pairs(&[42]).is_empty());
        assert_eq!(count_pairs(&[42]).most_frequent(), None);
    }

    #[test]
    fn test_most_frequent_tie_uses_first_occurrence() {
        // (d, c) and (a, b) both occur twice; (d, c) is seen first.
        let tokens: Vec<u32> = b"dcabdcab".iter().map(|&b| b as u32).collect();
        let stats = count_pairs(&tokens);

        let (pair, count) = stats.most_frequent().unwrap();
        assert_eq!(pair, (b'd' as u32, b'c' as u32));
        assert_eq!(count, 2);
    }

    #[test]
    fn test_most_frequent_prefers_higher_count() {
        let stats = count_pairs(&[9, 8, 1, 2, 1, 2]);
        assert_eq!(stats.most_frequent(), Some(((1, 2), 2)));
    }

    #[test]
    fn test_merge_is_greedy_and_non_overlapping() {
        assert_eq!(apply_merge(&[1, 1, 1, 1], (1, 1), 256), vec![256, 256]);
        assert_eq!(apply_merge(&[1, 1, 1], (1, 1), 256), vec![256, 1]);
    }

    #[test]
    fn test_merge_in_place_reports_count() {
        let mut tokens = vec![1, 2, 3, 1, 2];
        let merged = merge_in_place(&mut tokens, (1, 2), 300);

        assert_eq!(merged, 2);
        assert_eq!(tokens, vec![300, 3, 300]);
    }

    #[test]
    fn test_merge_without_match_is_identity() {
        assert_eq!(apply_merge(&[4, 5, 6], (6, 4), 256), vec![4, 5, 6]);
    }

    #[test]
    fn test_pair_counter_step() {
        let mut counter = PairCounter::from_bytes(b"abab");
        let (pair, count) = counter.count_pairs().most_frequent().unwrap();
        assert_eq!((pair, count), ((97, 98), 2));

        assert_eq!(counter.merge_pair(pair, 256), 2);
        assert_eq!(counter.tokens(), &[256, 256]);
    }
}
