//! Core BPE data structures.
//!
//! Symbol ids, merge rules, the vocabulary of byte expansions and the pair
//! priority queue used by the incremental trainer.

pub mod merges;
pub mod priority;
pub mod vocab;

pub use merges::{MergeMap, MergeRule, MergeRules, Pair, SymbolId, BASE_VOCAB_SIZE};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use vocab::Vocabulary;
