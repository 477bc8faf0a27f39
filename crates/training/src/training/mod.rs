//! Training infrastructure for BPE vocabularies.
//!
//! This module provides the training loop, its two statistics engines and
//! the corpus and reporter abstractions around it.

pub mod corpus;
pub mod counter;
pub mod incremental;
pub mod report;
pub mod trainer;

pub use corpus::{Corpus, FileCorpus, MemoryCorpus};
pub use counter::{apply_merge, count_pairs, merge_in_place, PairCounter, PairStats};
pub use incremental::IncrementalCounter;
pub use report::{LogReporter, Reporter};
pub use trainer::{
    train, BpeTrainer, StopReason, TrainingConfig, TrainingConfigBuilder, TrainingEngine,
    TrainingOutcome,
};
