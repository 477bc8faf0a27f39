//! Benchmark command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Benchmark command arguments.
#[derive(Parser)]
pub struct BenchmarkCommand {
    /// Path to the corpus file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Target vocabulary size
    #[arg(short = 's', long, default_value_t = 1_000)]
    pub vocab_size: usize,

    /// Number of training runs per engine
    #[arg(short = 'n', long, default_value_t = 3)]
    pub iterations: usize,
}

use anyhow::{bail, Context, Result as AnyhowResult};
use bytepair_tokenizer::Tokenizer;
use bytepair_training::{
    BpeTrainer, Corpus, FileCorpus, TrainingConfig, TrainingEngine, TrainingOutcome,
};
use std::time::{Duration, Instant};

pub fn run(cmd: BenchmarkCommand) -> AnyhowResult<()> {
    let iterations = cmd.iterations.max(1);
    let corpus = FileCorpus::new(&cmd.input)
        .load()
        .with_context(|| format!("failed to read {}", cmd.input.display()))?;

    println!("Benchmarking training...");
    println!("  Corpus: {} bytes", corpus.len());
    println!("  Target vocab size: {}", cmd.vocab_size);
    println!("  Iterations: {}", iterations);
    println!();

    let mut results: Vec<(TrainingEngine, TrainingOutcome)> = Vec::new();
    for engine in TrainingEngine::ALL {
        let config = TrainingConfig::builder()
            .vocab_size(cmd.vocab_size)
            .engine(engine)
            .build()
            .context("invalid training configuration")?;
        let trainer = BpeTrainer::new(config);

        let mut total = Duration::ZERO;
        let mut outcome = None;
        for _ in 0..iterations {
            let start = Instant::now();
            outcome = Some(trainer.train(&corpus)?);
            total += start.elapsed();
        }
        let Some(outcome) = outcome else {
            bail!("no training run completed for the {} engine", engine);
        };

        println!(
            "  {:<12} {:>10.3}ms avg, {} merges",
            engine,
            total.as_secs_f64() * 1000.0 / iterations as f64,
            outcome.merges.len()
        );
        results.push((engine, outcome));
    }

    if let [(_, first), rest @ ..] = results.as_slice() {
        for (engine, other) in rest {
            if other.merges != first.merges || other.tokens != first.tokens {
                bail!("the {} engine disagrees with the {} engine", engine, results[0].0);
            }
        }

        let tokenizer = Tokenizer::from_parts(first.vocab.clone(), first.merges.clone())?;
        let start = Instant::now();
        let ids = tokenizer.encode(&corpus);
        let elapsed = start.elapsed();

        println!();
        println!("Results:");
        println!("  Engines agree on {} merges", first.merges.len());
        println!(
            "  Compression: {} bytes -> {} tokens ({:.2}x)",
            corpus.len(),
            first.tokens.len(),
            first.compression_ratio()
        );
        println!(
            "  Encode: {:.3}ms ({:.0} bytes/s)",
            elapsed.as_secs_f64() * 1000.0,
            corpus.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
        );
        if ids != first.tokens {
            bail!("encoding the corpus does not reproduce the training tokens");
        }
    }

    Ok(())
}
