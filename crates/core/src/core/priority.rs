//! Priority queue for BPE merge candidates.
//!
//! Candidates are ordered by count, and among equal counts by the position of
//! the pair's leftmost occurrence in the token sequence (earlier wins). The
//! queue is lazy: updating a pair pushes a fresh entry, and entries whose
//! `(count, leftmost)` no longer match the current snapshot are skipped on pop.

use crate::core::merges::Pair;
use ahash::AHashMap;
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;

/// A merge candidate during BPE training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of symbol ids to merge
    pub pair: Pair,
    /// Number of occurrences of this pair
    pub count: u64,
    /// Position of the leftmost occurrence
    pub leftmost: usize,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, count: u64, leftmost: usize) -> Self {
        Self {
            pair,
            count,
            leftmost,
        }
    }
}

// Max-heap order: higher count first, then the earlier occurrence.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.leftmost.cmp(&self.leftmost))
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for BPE merge operations.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
#[derive(Debug, Default)]
pub struct PairPriorityQueue {
    heap: OctonaryHeap<MergeCandidate>,
    /// Latest `(count, leftmost)` per live pair
    current: AHashMap<Pair, (u64, usize)>,
}

impl PairPriorityQueue {
    /// Create a new empty priority queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new priority queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
            current: AHashMap::with_capacity(capacity),
        }
    }

    /// Push a merge candidate, superseding any earlier entry for its pair.
    pub fn push(&mut self, candidate: MergeCandidate) {
        self.current
            .insert(candidate.pair, (candidate.count, candidate.leftmost));
        self.heap.push(candidate);
    }

    /// Record new statistics for `pair`.
    ///
    /// Pushes nothing if the statistics are unchanged.
    pub fn update(&mut self, pair: Pair, count: u64, leftmost: usize) {
        if self.current.get(&pair) == Some(&(count, leftmost)) {
            return;
        }
        self.push(MergeCandidate::new(pair, count, leftmost));
    }

    /// Forget `pair`; any entries still in the heap become stale.
    pub fn remove(&mut self, pair: Pair) {
        self.current.remove(&pair);
    }

    /// Pop the highest priority live candidate.
    ///
    /// Returns None if the queue is empty or only contains stale entries.
    /// The popped pair is forgotten until it is pushed again.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        while let Some(candidate) = self.heap.pop() {
            match self.current.get(&candidate.pair) {
                Some(&(count, leftmost))
                    if count == candidate.count && leftmost == candidate.leftmost =>
                {
                    self.current.remove(&candidate.pair);
                    return Some(candidate);
                }
                _ => log::trace!(
                    "skipping stale candidate {:?} (count {}, leftmost {})",
                    candidate.pair,
                    candidate.count,
                    candidate.leftmost
                ),
            }
        }
        None
    }

    /// Number of heap entries, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the heap holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Clear all entries from the queue.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.current.clear();
    }

    /// Get the current count for a pair.
    pub fn get_count(&self, pair: Pair) -> Option<u64> {
        self.current.get(&pair).map(|&(count, _)| count)
    }
}
