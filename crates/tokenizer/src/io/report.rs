//! Reporter that persists the trained model.

use super::format::ModelFormat;
use super::save::ModelSaver;
use bytepair_core::Result;
use bytepair_training::{Reporter, TrainingOutcome};
use std::path::PathBuf;
use std::time::Duration;

/// Writes the vocabulary and merge list of each reported run to a file.
#[derive(Debug, Clone)]
pub struct ModelReporter {
    path: PathBuf,
    format: ModelFormat,
}

impl ModelReporter {
    pub fn new(path: impl Into<PathBuf>, format: ModelFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }
}

impl Reporter for ModelReporter {
    fn report(&mut self, outcome: &TrainingOutcome, _elapsed: Duration) -> Result<()> {
        ModelSaver::new(&outcome.vocab, &outcome.merges).save(&self.path, self.format)
    }
}
