//! Corpus providers.
//!
//! A corpus is anything that can hand the trainer its raw bytes. The trainer
//! loads the corpus once up front and never touches I/O inside the loop.

use bytepair_core::{BpeError, Result};
use std::path::{Path, PathBuf};

/// Source of training bytes.
pub trait Corpus {
    /// Read the whole corpus into memory.
    fn load(&self) -> Result<Vec<u8>>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

impl<C: Corpus + ?Sized> Corpus for &C {
    fn load(&self) -> Result<Vec<u8>> {
        (**self).load()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Corpus held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryCorpus {
    bytes: Vec<u8>,
}

impl MemoryCorpus {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for MemoryCorpus {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for MemoryCorpus {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for MemoryCorpus {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl Corpus for MemoryCorpus {
    fn load(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }

    fn describe(&self) -> String {
        format!("<memory: {} bytes>", self.bytes.len())
    }
}

/// Corpus read from a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCorpus {
    path: PathBuf,
}

impl FileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Corpus for FileCorpus {
    fn load(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).map_err(|err| BpeError::io(&self.path, err))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
