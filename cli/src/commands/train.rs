//! Train command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Corpus file; its raw bytes are the training data
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the trained model
    #[arg(short, long)]
    pub output: PathBuf,

    /// Target vocabulary size, including the 256 byte symbols
    #[arg(short = 's', long, default_value_t = 30_000)]
    pub vocab_size: usize,

    /// Stop once the best pair occurs fewer times than this
    #[arg(short, long, default_value_t = 1)]
    pub min_frequency: u64,

    /// Pair statistics engine (incremental or rescan)
    #[arg(long, default_value_t = TrainingEngine::Incremental)]
    pub engine: TrainingEngine,

    /// Model file format (binary or json)
    #[arg(short, long, default_value_t = ModelFormat::Binary)]
    pub format: ModelFormat,
}

use anyhow::{Context, Result as AnyhowResult};
use bytepair_tokenizer::{ModelFormat, ModelReporter};
use bytepair_training::{BpeTrainer, FileCorpus, LogReporter, TrainingConfig, TrainingEngine};

pub fn run(cmd: TrainCommand) -> AnyhowResult<()> {
    let config = TrainingConfig::builder()
        .vocab_size(cmd.vocab_size)
        .min_frequency(cmd.min_frequency)
        .engine(cmd.engine)
        .build()
        .context("invalid training configuration")?;

    let corpus = FileCorpus::new(&cmd.input);
    let mut reporter = (
        LogReporter::default(),
        ModelReporter::new(&cmd.output, cmd.format),
    );

    let outcome = BpeTrainer::new(config)
        .train_and_report(&corpus, &mut reporter)
        .with_context(|| format!("training on {} failed", cmd.input.display()))?;

    println!(
        "Learned {} merges (vocab size {}): {}",
        outcome.merges.len(),
        outcome.vocab.len(),
        outcome.stop_reason
    );
    println!("Saved {} model to {}", cmd.format, cmd.output.display());

    Ok(())
}
