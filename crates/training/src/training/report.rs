//! Reporting of finished training runs.

use super::trainer::TrainingOutcome;
use bytepair_core::Result;
use log::Level;
use std::time::Duration;

/// Receives the outcome of a training run.
pub trait Reporter {
    fn report(&mut self, outcome: &TrainingOutcome, elapsed: Duration) -> Result<()>;
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, outcome: &TrainingOutcome, elapsed: Duration) -> Result<()> {
        (**self).report(outcome, elapsed)
    }
}

impl<A: Reporter, B: Reporter> Reporter for (A, B) {
    fn report(&mut self, outcome: &TrainingOutcome, elapsed: Duration) -> Result<()> {
        self.0.report(outcome, elapsed)?;
        self.1.report(outcome, elapsed)
    }
}

/// Logs a one-line summary of the run.
#[derive(Debug, Clone, Copy)]
pub struct LogReporter {
    level: Level,
}

impl LogReporter {
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Default for LogReporter {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl Reporter for LogReporter {
    fn report(&mut self, outcome: &TrainingOutcome, elapsed: Duration) -> Result<()> {
        log::log!(
            self.level,
            "Learned {} merges (vocab size {}) in {:.2?}: {}; {} bytes -> {} tokens ({:.2}x)",
            outcome.merges.len(),
            outcome.vocab.len(),
            elapsed,
            outcome.stop_reason,
            outcome.corpus_len,
            outcome.tokens.len(),
            outcome.compression_ratio()
        );
        Ok(())
    }
}
