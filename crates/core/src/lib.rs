//! bytepair-core - Core byte-level BPE data structures
//!
//! This crate provides the types shared by the trainer and the tokenizer:
//! symbol ids and pairs, the ordered merge list, the vocabulary of byte
//! expansions, the merge priority queue and the error type.
//!
//! # Example
//!
//! ```rust
//! use bytepair_core::{MergeRules, Vocabulary};
//!
//! let mut merges = MergeRules::new();
//! let rule = merges.push((b'a' as u32, b'b' as u32)).unwrap();
//!
//! let mut vocab = Vocabulary::new();
//! vocab.add_merge(&rule).unwrap();
//! assert_eq!(vocab.get(rule.new_id), Some(&b"ab"[..]));
//! ```

pub mod error;
pub use error::{BpeError, Result};

pub mod core;
pub use core::{
    MergeCandidate, MergeMap, MergeRule, MergeRules, Pair, PairPriorityQueue, SymbolId,
    Vocabulary, BASE_VOCAB_SIZE,
};
