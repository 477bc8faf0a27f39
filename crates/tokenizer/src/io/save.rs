//! Save functionality for trained models.

use super::format::{ModelFormat, SerializedModel, SerializedToken, FORMAT_VERSION, MAGIC};
use bytepair_core::{BpeError, MergeRules, Result, Vocabulary};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Model saver - writes a vocabulary and its merge list.
pub struct ModelSaver<'a> {
    vocab: &'a Vocabulary,
    merges: &'a MergeRules,
}

impl<'a> ModelSaver<'a> {
    /// Create a new model saver.
    pub fn new(vocab: &'a Vocabulary, merges: &'a MergeRules) -> Self {
        Self { vocab, merges }
    }

    /// Save the model to `path` in `format`.
    ///
    /// Missing parent directories are created.
    pub fn save(&self, path: &Path, format: ModelFormat) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| BpeError::io(parent, e))?;
        }

        let file = File::create(path).map_err(|e| BpeError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        match format {
            ModelFormat::Binary => self.write_binary(&mut writer)?,
            ModelFormat::Json => self.write_json(&mut writer)?,
        }
        writer.flush().map_err(|e| BpeError::io(path, e))?;

        log::info!(
            "Saved {} model ({} tokens, {} merges) to {}",
            format,
            self.vocab.len(),
            self.merges.len(),
            path.display()
        );
        Ok(())
    }

    /// Encode the model in the binary format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_binary(&mut bytes)?;
        Ok(bytes)
    }

    /// Write the binary format to `writer`.
    pub fn write_binary<W: Write>(&self, writer: &mut W) -> Result<()> {
        let vocab_size = Self::count(self.vocab.len(), "vocabulary size")?;
        let merge_count = Self::count(self.merges.len(), "merge count")?;

        let mut buf = Vec::with_capacity(16 + self.merges.len() * 12 + self.vocab.len() * 8);
        buf.extend_from_slice(&MAGIC.to_le_bytes());
        buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        buf.extend_from_slice(&vocab_size.to_le_bytes());
        buf.extend_from_slice(&merge_count.to_le_bytes());

        for rule in self.merges {
            buf.extend_from_slice(&rule.pair.0.to_le_bytes());
            buf.extend_from_slice(&rule.pair.1.to_le_bytes());
            buf.extend_from_slice(&rule.new_id.to_le_bytes());
        }

        for (_, bytes) in self.vocab.iter() {
            let len = Self::count(bytes.len(), "token length")?;
            buf.extend_from_slice(&len.to_le_bytes());
            buf.extend_from_slice(bytes);
        }

        writer
            .write_all(&buf)
            .map_err(|e| BpeError::Save(format!("Failed to write model: {}", e)))
    }

    /// Write the JSON format to `writer`.
    pub fn write_json<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.serialize())?;
        Ok(())
    }

    /// Serialize the model to a structure.
    fn serialize(&self) -> SerializedModel {
        let vocab = self
            .vocab
            .iter()
            .map(|(id, bytes)| SerializedToken {
                id,
                bytes: bytes.to_vec(),
                text: String::from_utf8_lossy(bytes).into_owned(),
            })
            .collect();

        SerializedModel {
            version: FORMAT_VERSION,
            vocab_size: self.vocab.len(),
            merges: self.merges.iter().copied().collect(),
            vocab,
        }
    }

    fn count(n: usize, what: &str) -> Result<u32> {
        u32::try_from(n).map_err(|_| BpeError::Save(format!("{} {} does not fit in u32", what, n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vocabulary, MergeRules) {
        let mut merges = MergeRules::new();
        merges.push((97, 98)).unwrap();
        let vocab = Vocabulary::from_merges(&merges).unwrap();
        (vocab, merges)
    }

    #[test]
    fn test_binary_layout() {
        let (vocab, merges) = sample();
        let bytes = ModelSaver::new(&vocab, &merges).to_bytes().unwrap();

        assert_eq!(&bytes[0..4], b"!EPB");
        assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &257u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &1u32.to_le_bytes());
        // (97, 98) -> 256
        assert_eq!(&bytes[16..20], &97u32.to_le_bytes());
        assert_eq!(&bytes[20..24], &98u32.to_le_bytes());
        assert_eq!(&bytes[24..28], &256u32.to_le_bytes());
        // 256 base entries of 4 + 1 bytes, then "ab"
        assert_eq!(bytes.len(), 28 + 256 * 5 + 4 + 2);
        assert_eq!(&bytes[bytes.len() - 2..], b"ab");
    }

    #[test]
    fn test_json_contains_text() {
        let (vocab, merges) = sample();
        let mut out = Vec::new();
        ModelSaver::new(&vocab, &merges).write_json(&mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["vocab_size"], 257);
        assert_eq!(value["merges"][0]["new_id"], 256);
        assert_eq!(value["vocab"][256]["text"], "ab");
    }
}
