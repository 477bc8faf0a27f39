//! bytepair-training - BPE training infrastructure
//!
//! This crate learns a byte-level BPE merge list from a raw byte corpus.
//!
//! # Features
//!
//! - Deterministic merge selection: highest count first, ties go to the pair
//!   that occurs first in the current token sequence
//! - Incremental pair statistics over an indexed token arena, plus a
//!   full-rescan engine with identical output
//! - Configurable target vocabulary size and minimum pair frequency
//!
//! # Example
//!
//! ```rust
//! use bytepair_training::{BpeTrainer, TrainingConfig};
//!
//! let config = TrainingConfig::builder()
//!     .vocab_size(260)
//!     .build()
//!     .unwrap();
//!
//! let outcome = BpeTrainer::new(config).train(b"low lower lowest").unwrap();
//! assert_eq!(outcome.vocab.len(), 256 + outcome.merges.len());
//! ```

pub use bytepair_core::{BpeError, Result};

pub mod training;
pub use training::{
    apply_merge, count_pairs, merge_in_place, train, BpeTrainer, Corpus, FileCorpus,
    IncrementalCounter, LogReporter, MemoryCorpus, PairCounter, PairStats, Reporter,
    StopReason, TrainingConfig, TrainingConfigBuilder, TrainingEngine, TrainingOutcome,
};
