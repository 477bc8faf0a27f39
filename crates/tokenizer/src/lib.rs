//! bytepair-tokenizer - High-level tokenizer API
//!
//! This crate turns a trained merge list into a usable tokenizer: byte input
//! is encoded by replaying the learned merges, ids are decoded by expanding
//! them back to bytes, and models are saved and loaded in a compact binary
//! format or JSON.
//!
//! # Example
//!
//! ```rust
//! use bytepair_tokenizer::Tokenizer;
//!
//! let tokenizer = Tokenizer::builder()
//!     .vocab_size(300)
//!     .train(b"hello hello hello world")?;
//!
//! let ids = tokenizer.encode(b"hello world");
//! assert_eq!(tokenizer.decode(&ids)?, b"hello world");
//! # Ok::<(), bytepair_tokenizer::BpeError>(())
//! ```

// Re-export core types
pub use bytepair_core::{BpeError, Result};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Tokenizer, TokenizerBuilder};

// IO/Serialization
pub mod io;
pub use io::{ModelFormat, ModelLoader, ModelReporter, ModelSaver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
