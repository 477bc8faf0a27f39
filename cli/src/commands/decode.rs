//! Decode command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the trained model
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Token IDs to decode
    #[arg(required = true)]
    pub ids: Vec<u32>,

    /// Write the raw decoded bytes here instead of printing text
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

use anyhow::{Context, Result as AnyhowResult};
use bytepair_tokenizer::Tokenizer;

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)
        .with_context(|| format!("failed to load model {}", cmd.tokenizer.display()))?;

    match &cmd.output {
        Some(path) => {
            let bytes = tokenizer.decode(&cmd.ids)?;
            std::fs::write(path, &bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Decoded {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            println!("{}", tokenizer.decode_lossy(&cmd.ids)?);
        }
    }

    Ok(())
}
