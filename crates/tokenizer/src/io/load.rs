//! Load functionality for trained models.
//!
//! Both formats are validated in full: counts, the merge-tree invariant and
//! every vocabulary expansion are checked before a model is handed out.

use super::format::{ModelFormat, SerializedModel, FORMAT_VERSION, MAGIC, MAX_ENTRIES};
use bytepair_core::{BpeError, MergeRule, MergeRules, Result, Vocabulary, BASE_VOCAB_SIZE};
use std::path::Path;

/// Model loader - reads a vocabulary and its merge list.
pub struct ModelLoader;

impl ModelLoader {
    /// Load a model from `path`, detecting its format.
    pub fn load(path: &Path) -> Result<(Vocabulary, MergeRules)> {
        let data = std::fs::read(path).map_err(|e| BpeError::io(path, e))?;
        let format = ModelFormat::detect(&data);
        log::debug!("Loading {} model from {}", format, path.display());

        let (vocab, merges) = Self::from_bytes(&data)?;
        log::info!(
            "Loaded {} model ({} tokens, {} merges) from {}",
            format,
            vocab.len(),
            merges.len(),
            path.display()
        );
        Ok((vocab, merges))
    }

    /// Decode a model held in memory, detecting its format.
    pub fn from_bytes(data: &[u8]) -> Result<(Vocabulary, MergeRules)> {
        match ModelFormat::detect(data) {
            ModelFormat::Binary => Self::read_binary(data),
            ModelFormat::Json => Self::read_json(data),
        }
    }

    /// Decode the binary format.
    pub fn read_binary(data: &[u8]) -> Result<(Vocabulary, MergeRules)> {
        let mut reader = ByteReader::new(data);

        let magic = reader.read_u32("magic number")?;
        if magic != MAGIC {
            return Err(BpeError::Load(format!(
                "Invalid magic number {:#010x} (expected {:#010x})",
                magic, MAGIC
            )));
        }
        let version = reader.read_u32("version")?;
        if version != FORMAT_VERSION {
            return Err(BpeError::Load(format!(
                "Unsupported format version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        let vocab_size = reader.read_count("vocabulary size")?;
        let merge_count = reader.read_count("merge count")?;
        Self::check_sizes(vocab_size, merge_count)?;

        let mut merges = MergeRules::with_capacity(merge_count);
        for step in 0..merge_count {
            let first = reader.read_u32("merge pair")?;
            let second = reader.read_u32("merge pair")?;
            let new_id = reader.read_u32("merge id")?;
            merges.push_rule(MergeRule {
                step_index: step as u32,
                pair: (first, second),
                new_id,
            })?;
        }

        let mut entries = Vec::with_capacity(vocab_size);
        for _ in 0..vocab_size {
            let len = reader.read_u32("token length")? as usize;
            entries.push(reader.read_bytes(len, "token bytes")?.to_vec());
        }
        if !reader.is_at_end() {
            return Err(BpeError::Load(format!(
                "{} trailing bytes after the vocabulary",
                reader.remaining()
            )));
        }

        let vocab = Vocabulary::from_entries(entries, &merges)?;
        Ok((vocab, merges))
    }

    /// Decode the JSON format.
    pub fn read_json(data: &[u8]) -> Result<(Vocabulary, MergeRules)> {
        let model: SerializedModel = serde_json::from_slice(data)?;
        Self::deserialize(model)
    }

    /// Rebuild the model from a serialized structure.
    fn deserialize(model: SerializedModel) -> Result<(Vocabulary, MergeRules)> {
        if model.version != FORMAT_VERSION {
            return Err(BpeError::Load(format!(
                "Unsupported format version {} (expected {})",
                model.version, FORMAT_VERSION
            )));
        }
        Self::check_sizes(model.vocab_size, model.merges.len())?;
        if model.vocab.len() != model.vocab_size {
            return Err(BpeError::Load(format!(
                "vocab_size is {} but {} entries are listed",
                model.vocab_size,
                model.vocab.len()
            )));
        }

        let merges = MergeRules::from_rules(model.merges)?;

        let mut entries = Vec::with_capacity(model.vocab.len());
        for (expected, token) in model.vocab.into_iter().enumerate() {
            if token.id as usize != expected {
                return Err(BpeError::Load(format!(
                    "vocabulary entry {} has id {}",
                    expected, token.id
                )));
            }
            entries.push(token.bytes);
        }

        let vocab = Vocabulary::from_entries(entries, &merges)?;
        Ok((vocab, merges))
    }

    fn check_sizes(vocab_size: usize, merge_count: usize) -> Result<()> {
        let limit = MAX_ENTRIES as usize;
        if vocab_size > limit || merge_count > limit {
            return Err(BpeError::Load(format!(
                "model too large: {} tokens, {} merges (limit {})",
                vocab_size, merge_count, limit
            )));
        }
        if vocab_size != BASE_VOCAB_SIZE + merge_count {
            return Err(BpeError::Load(format!(
                "vocabulary size {} does not match {} merges",
                vocab_size, merge_count
            )));
        }
        Ok(())
    }
}

/// Bounds-checked little-endian cursor.
struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn read_bytes(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                BpeError::Load(format!(
                    "Truncated model: expected {} bytes of {} at offset {}",
                    len, what, self.offset
                ))
            })?;
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn read_u32(&mut self, what: &str) -> Result<u32> {
        let bytes = self.read_bytes(4, what)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_count(&mut self, what: &str) -> Result<usize> {
        let n = self.read_u32(what)?;
        if n > MAX_ENTRIES {
            return Err(BpeError::Load(format!(
                "{} {} exceeds the limit of {}",
                what, n, MAX_ENTRIES
            )));
        }
        Ok(n as usize)
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::save::ModelSaver;

    fn sample() -> (Vocabulary, MergeRules) {
        let mut merges = MergeRules::new();
        merges.push((104, 101)).unwrap();
        merges.push((256, 108)).unwrap();
        merges.push((257, 108)).unwrap();
        let vocab = Vocabulary::from_merges(&merges).unwrap();
        (vocab, merges)
    }

    fn sample_bytes() -> Vec<u8> {
        let (vocab, merges) = sample();
        ModelSaver::new(&vocab, &merges).to_bytes().unwrap()
    }

    #[test]
    fn test_binary_roundtrip() {
        let (vocab, merges) = sample();
        let (loaded_vocab, loaded_merges) = ModelLoader::from_bytes(&sample_bytes()).unwrap();

        assert_eq!(loaded_vocab, vocab);
        assert_eq!(loaded_merges, merges);
    }

    #[test]
    fn test_json_roundtrip() {
        let (vocab, merges) = sample();
        let mut json = Vec::new();
        ModelSaver::new(&vocab, &merges).write_json(&mut json).unwrap();

        let (loaded_vocab, loaded_merges) = ModelLoader::from_bytes(&json).unwrap();
        assert_eq!(loaded_vocab, vocab);
        assert_eq!(loaded_merges, merges);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = sample_bytes();
        bytes[0] = b'?';
        let err = ModelLoader::read_binary(&bytes).unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut bytes = sample_bytes();
        bytes[4..8].copy_from_slice(&2u32.to_le_bytes());
        let err = ModelLoader::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_rejects_truncated_file() {
        let bytes = sample_bytes();
        for cut in [6, 20, bytes.len() - 1] {
            assert!(
                ModelLoader::from_bytes(&bytes[..cut]).is_err(),
                "cut at {}",
                cut
            );
        }
    }

    #[test]
    fn test_rejects_oversized_counts() {
        let mut bytes = sample_bytes();
        bytes[8..12].copy_from_slice(&(MAX_ENTRIES + 1).to_le_bytes());
        assert!(ModelLoader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_rejects_mismatched_vocab_size() {
        let mut bytes = sample_bytes();
        bytes[8..12].copy_from_slice(&258u32.to_le_bytes());
        assert!(ModelLoader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_rejects_inconsistent_expansion() {
        let mut bytes = sample_bytes();
        // Last entry is "hell"; flip its final byte.
        let last = bytes.len() - 1;
        bytes[last] = b'p';
        let err = ModelLoader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, BpeError::InvalidMerge(_)));
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = sample_bytes();
        bytes.push(0);
        assert!(ModelLoader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_rejects_merge_with_undefined_parent() {
        let mut bytes = sample_bytes();
        // First merge's left symbol -> 300
        bytes[16..20].copy_from_slice(&300u32.to_le_bytes());
        let err = ModelLoader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, BpeError::InvalidMerge(_)));
    }

    #[test]
    fn test_json_rejects_bad_version() {
        let (vocab, merges) = sample();
        let mut json = Vec::new();
        ModelSaver::new(&vocab, &merges).write_json(&mut json).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        value["version"] = serde_json::json!(9);

        let err = ModelLoader::read_json(value.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, BpeError::Load(_)));
    }
}
