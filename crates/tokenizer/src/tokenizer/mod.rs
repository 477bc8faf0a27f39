//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that ties a
//! vocabulary and its merge list together for encoding and decoding.

use crate::io::{ModelFormat, ModelLoader, ModelSaver};
use bytepair_core::{BpeError, MergeRules, Result, SymbolId, Vocabulary, BASE_VOCAB_SIZE};
use bytepair_training::{
    merge_in_place, BpeTrainer, Corpus, TrainingConfig, TrainingEngine, TrainingOutcome,
};
use rayon::prelude::*;
use std::path::Path;

/// Builder for training a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TrainingConfig,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target vocabulary size.
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    /// Set the minimum frequency for merges.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    /// Set the training engine.
    pub fn engine(mut self, engine: TrainingEngine) -> Self {
        self.config.engine = engine;
        self
    }

    /// Train on `corpus` and return the tokenizer.
    pub fn train(self, corpus: &[u8]) -> Result<Tokenizer> {
        Tokenizer::train(corpus, self.config).map(|(tokenizer, _)| tokenizer)
    }

    /// Load `corpus` and train on it.
    pub fn train_corpus<C: Corpus + ?Sized>(self, corpus: &C) -> Result<Tokenizer> {
        let outcome = BpeTrainer::new(self.config).train_corpus(corpus)?;
        Ok(Tokenizer::from_outcome(&outcome))
    }
}

/// Main tokenizer struct.
///
/// Encodes bytes by replaying learned merges in learning order and decodes
/// ids by concatenating their byte expansions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenizer {
    vocab: Vocabulary,
    merges: MergeRules,
}

impl Tokenizer {
    /// A tokenizer with only the 256 byte symbols.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Combine a vocabulary and merge list after checking they agree.
    ///
    /// Every learned entry must be the concatenation of its parents.
    pub fn from_parts(vocab: Vocabulary, merges: MergeRules) -> Result<Self> {
        if vocab.len() != BASE_VOCAB_SIZE + merges.len() {
            return Err(BpeError::InvalidMerge(format!(
                "vocabulary has {} entries for {} merges",
                vocab.len(),
                merges.len()
            )));
        }
        let expected = Vocabulary::from_merges(&merges)?;
        if let Some(((id, _), _)) = vocab.iter().zip(expected.iter()).find(|(a, b)| a != b) {
            return Err(BpeError::InvalidMerge(format!(
                "symbol {} does not expand to the bytes of its parents",
                id
            )));
        }
        Ok(Self { vocab, merges })
    }

    /// Train a tokenizer on `corpus`.
    pub fn train(corpus: &[u8], config: TrainingConfig) -> Result<(Self, TrainingOutcome)> {
        let outcome = BpeTrainer::new(config).train(corpus)?;
        Ok((Self::from_outcome(&outcome), outcome))
    }

    fn from_outcome(outcome: &TrainingOutcome) -> Self {
        Self {
            vocab: outcome.vocab.clone(),
            merges: outcome.merges.clone(),
        }
    }

    /// Encode bytes to token ids.
    ///
    /// Starting from one id per byte, the earliest-learned merge present
    /// among adjacent pairs is applied everywhere, left to right, until no
    /// learned pair remains. On the training corpus this reproduces the
    /// trainer's final token sequence.
    pub fn encode(&self, bytes: &[u8]) -> Vec<SymbolId> {
        let mut ids: Vec<SymbolId> = bytes.iter().map(|&b| SymbolId::from(b)).collect();

        while ids.len() >= 2 {
            let best = ids
                .windows(2)
                .filter_map(|w| self.merges.get((w[0], w[1])))
                .min_by_key(|&(rank, _)| rank);
            let Some((rank, new_id)) = best else {
                break;
            };
            let Some(rule) = self.merges.rule(rank) else {
                break;
            };
            merge_in_place(&mut ids, rule.pair, new_id);
        }

        ids
    }

    /// Encode UTF-8 text.
    pub fn encode_str(&self, text: &str) -> Vec<SymbolId> {
        self.encode(text.as_bytes())
    }

    /// Encode a batch of inputs in parallel, preserving order.
    pub fn encode_batch<T>(&self, inputs: &[T]) -> Vec<Vec<SymbolId>>
    where
        T: AsRef<[u8]> + Sync,
    {
        inputs
            .par_iter()
            .map(|input| self.encode(input.as_ref()))
            .collect()
    }

    /// Decode token ids back to bytes.
    pub fn decode(&self, ids: &[SymbolId]) -> Result<Vec<u8>> {
        self.vocab.expand(ids)
    }

    /// Decode token ids to text, replacing invalid UTF-8.
    pub fn decode_lossy(&self, ids: &[SymbolId]) -> Result<String> {
        let bytes = self.decode(ids)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Get a reference to the merge list.
    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// Save the model to `path`.
    pub fn save(&self, path: &Path, format: ModelFormat) -> Result<()> {
        ModelSaver::new(&self.vocab, &self.merges).save(path, format)
    }

    /// Load a model saved in either format.
    pub fn load(path: &Path) -> Result<Self> {
        let (vocab, merges) = ModelLoader::load(path)?;
        Ok(Self { vocab, merges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained(corpus: &[u8], vocab_size: usize) -> Tokenizer {
        Tokenizer::builder()
            .vocab_size(vocab_size)
            .train(corpus)
            .unwrap()
    }

    #[test]
    fn test_base_tokenizer_is_identity() {
        let tokenizer = Tokenizer::new();
        assert_eq!(tokenizer.vocab_size(), 256);
        assert_eq!(tokenizer.encode(b"hi"), vec![104, 105]);
        assert_eq!(tokenizer.decode(&[104, 105]).unwrap(), b"hi");
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let tokenizer = trained(b"hello hello hello world", 270);

        let text = b"hello, world! \xff\x00 yellow";
        let ids = tokenizer.encode(text);
        assert_eq!(tokenizer.decode(&ids).unwrap(), text);
    }

    #[test]
    fn test_encode_uses_learned_merges() {
        let tokenizer = trained(b"aaa", 257);
        assert_eq!(tokenizer.encode(b"aaaa"), vec![256, 256]);
        assert_eq!(tokenizer.encode(b"aaa"), vec![256, 97]);
        assert_eq!(tokenizer.encode(b"b"), vec![98]);
        assert!(tokenizer.encode(b"").is_empty());
    }

    #[test]
    fn test_encode_matches_training_tokens() {
        let corpus = b"the cat sat on the mat with the hat";
        let config = TrainingConfig::builder().vocab_size(280).build().unwrap();
        let (tokenizer, outcome) = Tokenizer::train(corpus, config).unwrap();

        assert_eq!(tokenizer.encode(corpus), outcome.tokens);
    }

    #[test]
    fn test_decode_unknown_id() {
        let tokenizer = Tokenizer::new();
        assert!(matches!(
            tokenizer.decode(&[1, 4096]),
            Err(BpeError::UnknownTokenId(4096))
        ));
    }

    #[test]
    fn test_decode_lossy() {
        let tokenizer = Tokenizer::new();
        assert_eq!(tokenizer.decode_lossy(&[104, 0xff]).unwrap(), "h\u{FFFD}");
    }

    #[test]
    fn test_encode_batch_preserves_order() {
        let tokenizer = trained(b"abababab cdcdcd", 260);
        let inputs: Vec<&[u8]> = vec![&b"abab"[..], &b"cd"[..], &b""[..], &b"xyz"[..]];

        let batch = tokenizer.encode_batch(&inputs);
        let single: Vec<_> = inputs.iter().map(|i| tokenizer.encode(i)).collect();
        assert_eq!(batch, single);
    }

    #[test]
    fn test_from_parts_rejects_mismatch() {
        let tokenizer = trained(b"abcabc", 258);
        let other = trained(b"xyzxyz", 258);

        assert!(Tokenizer::from_parts(
            tokenizer.vocab().clone(),
            tokenizer.merges().clone()
        )
        .is_ok());
        assert!(Tokenizer::from_parts(other.vocab().clone(), tokenizer.merges().clone()).is_err());
        assert!(Tokenizer::from_parts(Vocabulary::new(), tokenizer.merges().clone()).is_err());
    }
}
