//! Incremental pair statistics over an arena-backed token list.
//!
//! The token sequence is a doubly-linked list stored in a `Vec` indexed by the
//! original byte position. Merging a pair rewrites the left node in place and
//! tombstones the right one, so node indices keep their left-to-right order
//! for the whole run. For every live pair the engine keeps the ordered set of
//! left-node indices where it occurs: its count is the set size and its first
//! occurrence is the smallest index. Only the neighbourhood of each merged
//! occurrence is touched per step.

use ahash::AHashMap;
use bytepair_core::{MergeCandidate, Pair, PairPriorityQueue, SymbolId};
use std::collections::BTreeSet;

/// Node in the linked token sequence.
#[derive(Debug, Clone, Copy)]
struct Node {
    token: SymbolId,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Incremental training state.
#[derive(Debug, Default)]
pub struct IncrementalCounter {
    /// Arena of nodes; `None` marks a node merged into its left neighbour.
    nodes: Vec<Option<Node>>,
    /// pair -> left-node indices of its occurrences
    positions: AHashMap<Pair, BTreeSet<usize>>,
    queue: PairPriorityQueue,
}

impl IncrementalCounter {
    /// Start from one base symbol per byte.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let n = bytes.len();
        let nodes = bytes
            .iter()
            .enumerate()
            .map(|(i, &b)| {
                Some(Node {
                    token: SymbolId::from(b),
                    prev: i.checked_sub(1),
                    next: (i + 1 < n).then_some(i + 1),
                })
            })
            .collect();

        let mut positions: AHashMap<Pair, BTreeSet<usize>> = AHashMap::new();
        for (i, window) in bytes.windows(2).enumerate() {
            let pair = (SymbolId::from(window[0]), SymbolId::from(window[1]));
            positions.entry(pair).or_default().insert(i);
        }

        let mut queue = PairPriorityQueue::with_capacity(positions.len());
        for (&pair, occurrences) in &positions {
            if let Some(&leftmost) = occurrences.first() {
                queue.push(MergeCandidate::new(pair, occurrences.len() as u64, leftmost));
            }
        }

        Self {
            nodes,
            positions,
            queue,
        }
    }

    /// Remove and return the best pair with its count.
    ///
    /// The pair is not merged; call [`merge_pair`](Self::merge_pair) next.
    pub fn pop_best(&mut self) -> Option<(Pair, u64)> {
        self.queue.pop().map(|candidate| (candidate.pair, candidate.count))
    }

    /// Current number of occurrences of `pair`.
    pub fn count(&self, pair: Pair) -> u64 {
        self.positions.get(&pair).map_or(0, |set| set.len() as u64)
    }

    /// Merge every non-overlapping occurrence of `pair`, left to right.
    ///
    /// Returns the number of replacements.
    pub fn merge_pair(&mut self, pair: Pair, new_id: SymbolId) -> usize {
        let Some(occurrences) = self.positions.remove(&pair) else {
            return 0;
        };
        self.queue.remove(pair);

        let mut touched: Vec<Pair> = Vec::new();
        let mut merged = 0;

        for left in occurrences {
            let Some(right) = self.match_at(pair, left) else {
                // Consumed by the previous, overlapping replacement.
                continue;
            };
            let prev = self.node(left).and_then(|n| n.prev);
            let next = self.node(right).and_then(|n| n.next);

            self.unlink_neighbours(left, right, prev, next, &mut touched);
            self.fuse(left, right, next, new_id);
            self.link_neighbours(left, prev, next, new_id, &mut touched);
            merged += 1;
        }

        touched.sort_unstable();
        touched.dedup();
        for changed in touched {
            match self.positions.get(&changed).and_then(|set| {
                set.first().map(|&leftmost| (set.len() as u64, leftmost))
            }) {
                Some((count, leftmost)) => self.queue.update(changed, count, leftmost),
                None => self.queue.remove(changed),
            }
        }

        merged
    }

    /// Collect the live token sequence.
    pub fn tokens(&self) -> Vec<SymbolId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.node(0).map(|_| 0);
        while let Some(idx) = cursor {
            let Some(node) = self.node(idx) else { break };
            out.push(node.token);
            cursor = node.next;
        }
        out
    }

    #[inline]
    fn node(&self, idx: usize) -> Option<Node> {
        self.nodes.get(idx).copied().flatten()
    }

    /// Right node index if `pair` still starts at `left`.
    fn match_at(&self, pair: Pair, left: usize) -> Option<usize> {
        let node = self.node(left)?;
        if node.token != pair.0 {
            return None;
        }
        let right = node.next?;
        (self.node(right)?.token == pair.1).then_some(right)
    }

    fn unlink_neighbours(
        &mut self,
        left: usize,
        right: usize,
        prev: Option<usize>,
        next: Option<usize>,
        touched: &mut Vec<Pair>,
    ) {
        let (Some(left_node), Some(right_node)) = (self.node(left), self.node(right)) else {
            return;
        };
        if let Some((p, prev_node)) = prev.and_then(|p| self.node(p).map(|n| (p, n))) {
            self.forget((prev_node.token, left_node.token), p, touched);
        }
        if let Some(next_node) = next.and_then(|n| self.node(n)) {
            self.forget((right_node.token, next_node.token), right, touched);
        }
    }

    fn link_neighbours(
        &mut self,
        left: usize,
        prev: Option<usize>,
        next: Option<usize>,
        new_id: SymbolId,
        touched: &mut Vec<Pair>,
    ) {
        if let Some((p, prev_node)) = prev.and_then(|p| self.node(p).map(|n| (p, n))) {
            self.record((prev_node.token, new_id), p, touched);
        }
        if let Some(next_node) = next.and_then(|n| self.node(n)) {
            self.record((new_id, next_node.token), left, touched);
        }
    }

    /// Rewrite `left` as the fused symbol and drop `right` from the list.
    fn fuse(&mut self, left: usize, right: usize, next: Option<usize>, new_id: SymbolId) {
        if let Some(node) = self.nodes[left].as_mut() {
            node.token = new_id;
            node.next = next;
        }
        if let Some(n) = next {
            if let Some(node) = self.nodes[n].as_mut() {
                node.prev = Some(left);
            }
        }
        self.nodes[right] = None;
    }

    fn forget(&mut self, pair: Pair, at: usize, touched: &mut Vec<Pair>) {
        if let Some(set) = self.positions.get_mut(&pair) {
            set.remove(&at);
            if set.is_empty() {
                self.positions.remove(&pair);
            }
            touched.push(pair);
        }
    }

    fn record(&mut self, pair: Pair, at: usize, touched: &mut Vec<Pair>) {
        self.positions.entry(pair).or_default().insert(at);
        touched.push(pair);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(bytes: &[u8]) -> Vec<SymbolId> {
        bytes.iter().map(|&b| SymbolId::from(b)).collect()
    }

    #[test]
    fn test_initial_counts() {
        let counter = IncrementalCounter::from_bytes(b"abab");
        assert_eq!(counter.count((97, 98)), 2);
        assert_eq!(counter.count((98, 97)), 1);
        assert_eq!(counter.tokens(), ids(b"abab"));
    }

    #[test]
    fn test_overlapping_run() {
        let mut counter = IncrementalCounter::from_bytes(&[1, 1, 1, 1]);
        assert_eq!(counter.pop_best(), Some(((1, 1), 3)));

        assert_eq!(counter.merge_pair((1, 1), 256), 2);
        assert_eq!(counter.tokens(), vec![256, 256]);
        assert_eq!(counter.count((1, 1)), 0);
        assert_eq!(counter.count((256, 256)), 1);
    }

    #[test]
    fn test_odd_run_leaves_tail() {
        let mut counter = IncrementalCounter::from_bytes(b"aaa");
        assert_eq!(counter.merge_pair((97, 97), 256), 1);
        assert_eq!(counter.tokens(), vec![256, 97]);
        assert_eq!(counter.count((256, 97)), 1);
        assert_eq!(counter.pop_best(), Some(((256, 97), 1)));
    }

    #[test]
    fn test_neighbour_counts_follow_merges() {
        let mut counter = IncrementalCounter::from_bytes(b"xaby");
        counter.merge_pair((97, 98), 256);

        assert_eq!(counter.tokens(), vec![120, 256, 121]);
        assert_eq!(counter.count((120, 97)), 0);
        assert_eq!(counter.count((98, 121)), 0);
        assert_eq!(counter.count((120, 256)), 1);
        assert_eq!(counter.count((256, 121)), 1);
    }

    #[test]
    fn test_tie_break_by_first_occurrence() {
        // (c, d) and (a, b) both occur twice; (c, d) comes first.
        let mut counter = IncrementalCounter::from_bytes(b"cdabcdab");
        let (pair, count) = counter.pop_best().unwrap();
        assert_eq!(pair, (99, 100));
        assert_eq!(count, 2);
    }

    #[test]
    fn test_single_byte_has_no_pairs() {
        let mut counter = IncrementalCounter::from_bytes(&[0]);
        assert_eq!(counter.pop_best(), None);
        assert_eq!(counter.tokens(), vec![0]);
    }
}
