//! BPE trainer implementation.
//!
//! This module implements the core BPE training loop: starting from one
//! symbol per input byte, repeatedly fuse the most frequent adjacent pair into
//! a new symbol until the target vocabulary size is reached or no pair is left.
//! Ties between equally frequent pairs go to the pair that occurs first in the
//! current token sequence.

use super::corpus::Corpus;
use super::counter::PairCounter;
use super::incremental::IncrementalCounter;
use super::report::Reporter;
use bytepair_core::{
    BpeError, MergeRules, Pair, Result, SymbolId, Vocabulary, BASE_VOCAB_SIZE,
};
use log::{debug, info};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Strategy used to maintain pair statistics between merges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TrainingEngine {
    /// Linked token arena with per-pair occurrence sets and a lazy heap
    #[default]
    Incremental,
    /// Recount and rewrite the whole sequence every step
    Rescan,
}

impl TrainingEngine {
    /// All engines, in display order.
    pub const ALL: [TrainingEngine; 2] = [TrainingEngine::Incremental, TrainingEngine::Rescan];

    /// Lowercase name used in logs and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingEngine::Incremental => "incremental",
            TrainingEngine::Rescan => "rescan",
        }
    }
}

impl fmt::Display for TrainingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingEngine {
    type Err = BpeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "incremental" => Ok(TrainingEngine::Incremental),
            "rescan" => Ok(TrainingEngine::Rescan),
            other => Err(BpeError::InvalidConfiguration(format!(
                "unknown training engine '{}' (expected incremental or rescan)",
                other
            ))),
        }
    }
}

/// Configuration for BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingConfig {
    /// Target vocabulary size, base symbols included
    pub vocab_size: usize,
    /// Minimum count for a pair to be merged
    pub min_frequency: u64,
    /// Statistics engine
    pub engine: TrainingEngine,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 30_000,
            min_frequency: 1,
            engine: TrainingEngine::default(),
        }
    }
}

impl TrainingConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check the configuration before any training step runs.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size < BASE_VOCAB_SIZE {
            return Err(BpeError::InvalidConfiguration(format!(
                "vocab_size must be at least {}, got {}",
                BASE_VOCAB_SIZE, self.vocab_size
            )));
        }
        if u32::try_from(self.vocab_size).is_err() {
            return Err(BpeError::InvalidConfiguration(format!(
                "vocab_size {} does not fit the u32 symbol id space",
                self.vocab_size
            )));
        }
        if self.min_frequency == 0 {
            return Err(BpeError::InvalidConfiguration(
                "min_frequency must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Number of merges needed to reach `vocab_size`.
    pub fn requested_merges(&self) -> usize {
        self.vocab_size.saturating_sub(BASE_VOCAB_SIZE)
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Set the target vocabulary size.
    pub fn vocab_size(mut self, vocab_size: usize) -> Self {
        self.config.vocab_size = vocab_size;
        self
    }

    /// Set the minimum pair count.
    pub fn min_frequency(mut self, min_frequency: u64) -> Self {
        self.config.min_frequency = min_frequency;
        self
    }

    /// Set the statistics engine.
    pub fn engine(mut self, engine: TrainingEngine) -> Self {
        self.config.engine = engine;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<TrainingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Why the training loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The vocabulary reached the requested size
    TargetReached,
    /// The token sequence has no adjacent pair left
    Exhausted,
    /// The best remaining pair occurs fewer than `min_frequency` times
    BelowMinFrequency,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::TargetReached => "target vocabulary size reached",
            StopReason::Exhausted => "no adjacent pairs left",
            StopReason::BelowMinFrequency => "best pair below minimum frequency",
        };
        f.write_str(text)
    }
}

/// Result of a training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingOutcome {
    /// Base symbols plus one entry per merge
    pub vocab: Vocabulary,
    /// Merges in learning order
    pub merges: MergeRules,
    /// The corpus after the last merge
    pub tokens: Vec<SymbolId>,
    pub stop_reason: StopReason,
    /// Corpus length in bytes
    pub corpus_len: usize,
}

impl TrainingOutcome {
    /// Input bytes per output token.
    pub fn compression_ratio(&self) -> f64 {
        if self.tokens.is_empty() {
            return 0.0;
        }
        self.corpus_len as f64 / self.tokens.len() as f64
    }

    /// Split into vocabulary and merge list.
    pub fn into_parts(self) -> (Vocabulary, MergeRules) {
        (self.vocab, self.merges)
    }
}

/// The two operations the training loop needs from a statistics engine.
trait MergeEngine {
    /// Best pair and its count, or None when no pair is left.
    fn next_pair(&mut self) -> Option<(Pair, u64)>;

    /// Rewrite the sequence, returning the number of replacements.
    fn merge(&mut self, pair: Pair, new_id: SymbolId) -> usize;

    fn into_tokens(self) -> Vec<SymbolId>;
}

impl MergeEngine for PairCounter {
    fn next_pair(&mut self) -> Option<(Pair, u64)> {
        self.count_pairs().most_frequent()
    }

    fn merge(&mut self, pair: Pair, new_id: SymbolId) -> usize {
        self.merge_pair(pair, new_id)
    }

    fn into_tokens(self) -> Vec<SymbolId> {
        PairCounter::into_tokens(self)
    }
}

impl MergeEngine for IncrementalCounter {
    fn next_pair(&mut self) -> Option<(Pair, u64)> {
        self.pop_best()
    }

    fn merge(&mut self, pair: Pair, new_id: SymbolId) -> usize {
        self.merge_pair(pair, new_id)
    }

    fn into_tokens(self) -> Vec<SymbolId> {
        self.tokens()
    }
}

/// BPE trainer.
///
/// Trains a byte-level vocabulary by iteratively merging the most frequent
/// adjacent symbol pairs.
#[derive(Debug, Clone, Default)]
pub struct BpeTrainer {
    config: TrainingConfig,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Create a trainer with default settings and the given target size.
    pub fn with_vocab_size(vocab_size: usize) -> Self {
        Self::new(TrainingConfig {
            vocab_size,
            ..Default::default()
        })
    }

    /// The trainer's configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on an in-memory corpus.
    ///
    /// Fails with [`BpeError::InvalidConfiguration`] before doing any work if
    /// the configuration is invalid or the corpus is empty. Running out of
    /// pairs early is not an error; see [`TrainingOutcome::stop_reason`].
    pub fn train(&self, corpus: &[u8]) -> Result<TrainingOutcome> {
        self.config.validate()?;
        if corpus.is_empty() {
            return Err(BpeError::InvalidConfiguration(
                "training corpus is empty".into(),
            ));
        }

        info!(
            "Training on {} bytes: target vocab size {}, min frequency {}, {} engine",
            corpus.len(),
            self.config.vocab_size,
            self.config.min_frequency,
            self.config.engine
        );

        match self.config.engine {
            TrainingEngine::Incremental => {
                self.run(IncrementalCounter::from_bytes(corpus), corpus.len())
            }
            TrainingEngine::Rescan => self.run(PairCounter::from_bytes(corpus), corpus.len()),
        }
    }

    /// Load `corpus` and train on its bytes.
    pub fn train_corpus<C: Corpus + ?Sized>(&self, corpus: &C) -> Result<TrainingOutcome> {
        info!("Loading corpus {}", corpus.describe());
        let bytes = corpus.load()?;
        self.train(&bytes)
    }

    /// Train on `corpus` and hand the timed outcome to `reporter`.
    pub fn train_and_report<C, R>(&self, corpus: &C, reporter: &mut R) -> Result<TrainingOutcome>
    where
        C: Corpus + ?Sized,
        R: Reporter + ?Sized,
    {
        let start = Instant::now();
        let outcome = self.train_corpus(corpus)?;
        reporter.report(&outcome, start.elapsed())?;
        Ok(outcome)
    }

    fn run<E: MergeEngine>(&self, mut engine: E, corpus_len: usize) -> Result<TrainingOutcome> {
        let requested = self.config.requested_merges();
        // Every merge shortens the sequence, so at most len - 1 can happen.
        let capacity = requested.min(corpus_len.saturating_sub(1));
        let mut merges = MergeRules::with_capacity(capacity);
        let mut vocab = Vocabulary::with_capacity(BASE_VOCAB_SIZE + capacity);
        let mut last_percent = 0;

        let stop_reason = loop {
            if merges.len() >= requested {
                break StopReason::TargetReached;
            }
            let Some((pair, count)) = engine.next_pair() else {
                break StopReason::Exhausted;
            };
            if count < self.config.min_frequency {
                break StopReason::BelowMinFrequency;
            }

            let rule = merges.push(pair)?;
            vocab.add_merge(&rule)?;
            let replaced = engine.merge(pair, rule.new_id);
            debug!(
                "Merge {}: {:?} -> {} (count {}, replaced {})",
                rule.step_index, pair, rule.new_id, count, replaced
            );

            let percent = merges.len() * 100 / requested;
            if percent > last_percent {
                last_percent = percent;
                info!(
                    "Progress: {}% ({}/{} merges), last pair {:?} count {}",
                    percent,
                    merges.len(),
                    requested,
                    pair,
                    count
                );
            }
        };

        let tokens = engine.into_tokens();
        info!(
            "Training finished: {} merges, vocab size {}, {} tokens ({})",
            merges.len(),
            vocab.len(),
            tokens.len(),
            stop_reason
        );

        Ok(TrainingOutcome {
            vocab,
            merges,
            tokens,
            stop_reason,
            corpus_len,
        })
    }
}

/// Train a vocabulary of up to `target_vocab_size` symbols on `corpus`.
///
/// Shorthand for [`BpeTrainer::with_vocab_size`] followed by
/// [`BpeTrainer::train`].
pub fn train(corpus: &[u8], target_vocab_size: usize) -> Result<(Vocabulary, MergeRules)> {
    BpeTrainer::with_vocab_size(target_vocab_size)
        .train(corpus)
        .map(TrainingOutcome::into_parts)
}
