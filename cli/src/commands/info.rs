//! Info command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Info command arguments.
#[derive(Parser)]
pub struct InfoCommand {
    /// Path to the trained model
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Also list the first N merges
    #[arg(short = 'n', long, default_value_t = 0)]
    pub merges: usize,
}

use anyhow::{Context, Result as AnyhowResult};
use bytepair_tokenizer::Tokenizer;

pub fn run(cmd: InfoCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)
        .with_context(|| format!("failed to load model {}", cmd.tokenizer.display()))?;
    let vocab = tokenizer.vocab();

    println!("Model: {}", cmd.tokenizer.display());
    println!("  Vocab size: {}", vocab.len());
    println!("  Merges: {}", tokenizer.merges().len());
    if let Some((id, bytes)) = vocab.longest() {
        println!(
            "  Longest token: {} ({} bytes) {:?}",
            id,
            bytes.len(),
            vocab.display(id).unwrap_or_default()
        );
    }

    for rule in tokenizer.merges().iter().take(cmd.merges) {
        let render = |id| vocab.display(id).unwrap_or_default();
        println!(
            "  {:>6}: ({}, {}) -> {}  {:?} + {:?}",
            rule.step_index,
            rule.pair.0,
            rule.pair.1,
            rule.new_id,
            render(rule.pair.0),
            render(rule.pair.1)
        );
    }

    Ok(())
}
