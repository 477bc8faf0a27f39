//! Merge rule management for BPE.
//!
//! Merge rules are stored in the order they were learned. A pair lookup
//! map sits alongside the ordered list so encoders can find the rank of an
//! adjacent pair in constant time.

use crate::error::{BpeError, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A symbol id. Ids below [`BASE_VOCAB_SIZE`] are raw bytes.
pub type SymbolId = u32;

/// A pair of adjacent symbol ids.
pub type Pair = (SymbolId, SymbolId);

/// Number of single-byte base symbols.
pub const BASE_VOCAB_SIZE: usize = 256;

/// Merge lookup: pair -> (rank, new_symbol_id).
///
/// The rank is the step index at which the pair was learned
/// (lower rank = higher priority when encoding).
pub type MergeMap = AHashMap<Pair, (u32, SymbolId)>;

/// A single learned merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeRule {
    /// Training step that produced this rule
    pub step_index: u32,
    /// The fused pair
    pub pair: Pair,
    /// Symbol id assigned to the fused pair (`256 + step_index`)
    pub new_id: SymbolId,
}

impl MergeRule {
    /// Create the rule for `pair` learned at `step_index`.
    #[inline]
    pub fn new(step_index: u32, pair: Pair) -> Self {
        Self {
            step_index,
            pair,
            new_id: BASE_VOCAB_SIZE as u32 + step_index,
        }
    }
}

/// Ordered collection of BPE merge rules with pair lookup.
///
/// Appending enforces the merge-tree invariant: step indices have no gaps,
/// `new_id == 256 + step_index`, and both parents are already defined.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    rules: Vec<MergeRule>,
    index: MergeMap,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new collection with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rules: Vec::with_capacity(capacity),
            index: MergeMap::with_capacity(capacity),
        }
    }

    /// Build a collection from rules in learning order, validating each one.
    pub fn from_rules(rules: impl IntoIterator<Item = MergeRule>) -> Result<Self> {
        let mut merges = Self::new();
        for rule in rules {
            merges.push_rule(rule)?;
        }
        Ok(merges)
    }

    /// Learn `pair` as the next merge and return the recorded rule.
    pub fn push(&mut self, pair: Pair) -> Result<MergeRule> {
        let step_index = u32::try_from(self.rules.len())
            .map_err(|_| BpeError::InvalidMerge("merge list exceeds the u32 id space".into()))?;
        let rule = MergeRule::new(step_index, pair);
        self.push_rule(rule)?;
        Ok(rule)
    }

    /// Append an already-built rule, e.g. one read back from a model file.
    pub fn push_rule(&mut self, rule: MergeRule) -> Result<()> {
        let expected = self.rules.len();
        if rule.step_index as usize != expected {
            return Err(BpeError::InvalidMerge(format!(
                "expected step index {}, found {}",
                expected, rule.step_index
            )));
        }
        if rule.new_id as usize != BASE_VOCAB_SIZE + expected {
            return Err(BpeError::InvalidMerge(format!(
                "step {} must create id {}, found {}",
                expected,
                BASE_VOCAB_SIZE + expected,
                rule.new_id
            )));
        }
        let (first, second) = rule.pair;
        if first >= rule.new_id || second >= rule.new_id {
            return Err(BpeError::InvalidMerge(format!(
                "step {} references undefined symbol in pair ({}, {})",
                expected, first, second
            )));
        }
        if self.index.contains_key(&rule.pair) {
            return Err(BpeError::InvalidMerge(format!(
                "pair ({}, {}) learned twice",
                first, second
            )));
        }

        self.index.insert(rule.pair, (rule.step_index, rule.new_id));
        self.rules.push(rule);
        Ok(())
    }

    /// Get the merge rule for a pair.
    ///
    /// Returns Some((rank, new_id)) if this pair should be merged,
    /// None otherwise.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, SymbolId)> {
        self.index.get(&pair).copied()
    }

    /// Get the rule learned at `rank`.
    #[inline]
    pub fn rule(&self, rank: u32) -> Option<&MergeRule> {
        self.rules.get(rank as usize)
    }

    /// Rules in learning order.
    #[inline]
    pub fn as_slice(&self) -> &[MergeRule] {
        &self.rules
    }

    /// Iterate over rules in learning order.
    pub fn iter(&self) -> std::slice::Iter<'_, MergeRule> {
        self.rules.iter()
    }

    /// The most recently learned rule.
    pub fn last(&self) -> Option<&MergeRule> {
        self.rules.last()
    }

    /// Id the next learned merge would receive.
    #[inline]
    pub fn next_id(&self) -> SymbolId {
        (BASE_VOCAB_SIZE + self.rules.len()) as SymbolId
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// The index is derived from `rules`, so equality only looks at the list.
impl PartialEq for MergeRules {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl Eq for MergeRules {}

impl<'a> IntoIterator for &'a MergeRules {
    type Item = &'a MergeRule;
    type IntoIter = std::slice::Iter<'a, MergeRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_sequential_ids() {
        let mut rules = MergeRules::new();
        let a = rules.push((97, 97)).unwrap();
        let b = rules.push((256, 98)).unwrap();

        assert_eq!(a, MergeRule { step_index: 0, pair: (97, 97), new_id: 256 });
        assert_eq!(b, MergeRule { step_index: 1, pair: (256, 98), new_id: 257 });
        assert_eq!(rules.next_id(), 258);
    }

    #[test]
    fn test_get_returns_rank_and_id() {
        let mut rules = MergeRules::new();
        rules.push((0, 1)).unwrap();
        rules.push((1, 2)).unwrap();

        assert_eq!(rules.get((0, 1)), Some((0, 256)));
        assert_eq!(rules.get((1, 2)), Some((1, 257)));
        assert_eq!(rules.get((2, 3)), None);
        assert_eq!(rules.rule(1).map(|r| r.pair), Some((1, 2)));
    }

    #[test]
    fn test_rejects_undefined_parent() {
        let mut rules = MergeRules::new();
        let err = rules.push((256, 1)).unwrap_err();
        assert!(matches!(err, BpeError::InvalidMerge(_)));
        assert!(rules.is_empty());
    }

    #[test]
    fn test_rejects_step_gap() {
        let mut rules = MergeRules::new();
        rules.push((1, 2)).unwrap();

        let skipped = MergeRule::new(2, (3, 4));
        assert!(rules.push_rule(skipped).is_err());
    }

    #[test]
    fn test_rejects_wrong_new_id() {
        let rule = MergeRule {
            step_index: 0,
            pair: (1, 2),
            new_id: 300,
        };
        assert!(MergeRules::from_rules([rule]).is_err());
    }

    #[test]
    fn test_rejects_duplicate_pair() {
        let mut rules = MergeRules::new();
        rules.push((5, 6)).unwrap();
        assert!(rules.push((5, 6)).is_err());
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_from_rules_roundtrip() {
        let mut rules = MergeRules::new();
        rules.push((104, 101)).unwrap();
        rules.push((256, 108)).unwrap();

        let rebuilt = MergeRules::from_rules(rules.iter().copied()).unwrap();
        assert_eq!(rebuilt, rules);
    }
}
