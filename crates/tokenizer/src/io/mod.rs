//! Serialization and deserialization for BPE models.
//!
//! This module provides saving and loading of trained models in the compact
//! binary format and in JSON.

pub mod format;
pub mod load;
pub mod report;
pub mod save;

pub use format::{ModelFormat, SerializedModel, SerializedToken, FORMAT_VERSION, MAGIC};
pub use load::ModelLoader;
pub use report::ModelReporter;
pub use save::ModelSaver;
