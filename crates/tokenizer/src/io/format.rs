//! Format definitions for model serialization.
//!
//! Two formats are supported. The binary format is compact little-endian:
//!
//! ```text
//! [magic: u32][version: u32]
//! [vocab_size: u32][merge_count: u32]
//! [merge_count x (first: u32, second: u32, new_id: u32)]
//! [vocab_size x (len: u32, bytes[len])]
//! ```
//!
//! The JSON format carries the same data plus a lossy text rendering of every
//! token for people reading the file.

use bytepair_core::{BpeError, MergeRule, Result, SymbolId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Leading word of a binary model, stored little-endian as the bytes `!EPB`.
pub const MAGIC: u32 = 0x4250_4521;

/// Version written by this crate and the only one accepted on load.
pub const FORMAT_VERSION: u32 = 1;

/// Upper bound on vocabulary and merge counts read from a file.
pub const MAX_ENTRIES: u32 = 1_000_000;

/// Model format types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelFormat {
    /// Little-endian binary
    #[default]
    Binary,
    /// Human-readable JSON
    Json,
}

impl ModelFormat {
    /// Guess the format of a model file from its first bytes.
    pub fn detect(data: &[u8]) -> ModelFormat {
        match data.get(..4) {
            Some(head) if head == MAGIC.to_le_bytes().as_slice() => ModelFormat::Binary,
            _ => ModelFormat::Json,
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ModelFormat::Binary => "bin",
            ModelFormat::Json => "json",
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFormat::Binary => f.write_str("binary"),
            ModelFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for ModelFormat {
    type Err = BpeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "bin" => Ok(ModelFormat::Binary),
            "json" => Ok(ModelFormat::Json),
            other => Err(BpeError::InvalidConfiguration(format!(
                "unknown model format '{}' (expected binary or json)",
                other
            ))),
        }
    }
}

/// A vocabulary entry in the JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedToken {
    pub id: SymbolId,
    /// Authoritative expansion
    pub bytes: Vec<u8>,
    /// Lossy UTF-8 rendering, ignored on load
    #[serde(default)]
    pub text: String,
}

/// Complete model in the JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedModel {
    /// Format version
    pub version: u32,
    pub vocab_size: usize,
    /// Merge rules in learning order
    pub merges: Vec<MergeRule>,
    pub vocab: Vec<SerializedToken>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes() {
        assert_eq!(&MAGIC.to_le_bytes(), b"!EPB");
    }

    #[test]
    fn test_detect() {
        let mut binary = MAGIC.to_le_bytes().to_vec();
        binary.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        assert_eq!(ModelFormat::detect(&binary), ModelFormat::Binary);
        assert_eq!(ModelFormat::detect(b"{\"version\":1}"), ModelFormat::Json);
        assert_eq!(ModelFormat::detect(b"!E"), ModelFormat::Json);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<ModelFormat>().unwrap(), ModelFormat::Json);
        assert_eq!("BIN".parse::<ModelFormat>().unwrap(), ModelFormat::Binary);
        assert!("yaml".parse::<ModelFormat>().is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let model = SerializedModel {
            version: FORMAT_VERSION,
            vocab_size: 257,
            merges: vec![MergeRule::new(0, (104, 101))],
            vocab: vec![SerializedToken {
                id: 256,
                bytes: b"he".to_vec(),
                text: "he".to_string(),
            }],
        };

        let json = serde_json::to_string(&model).unwrap();
        let deserialized: SerializedModel = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, model);
    }
}
