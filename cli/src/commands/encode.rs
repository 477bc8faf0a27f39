//! Encode command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the trained model
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Text to encode ("-" reads raw bytes from stdin)
    #[arg(short, long)]
    pub input: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

use anyhow::{Context, Result as AnyhowResult};
use bytepair_tokenizer::Tokenizer;
use std::io::Read;

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.tokenizer)
        .with_context(|| format!("failed to load model {}", cmd.tokenizer.display()))?;

    let input = if cmd.input == "-" {
        let mut buffer = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read stdin")?;
        buffer
    } else {
        cmd.input.into_bytes()
    };

    let ids = tokenizer.encode(&input);
    let output = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Encoded {} tokens to {}", ids.len(), path.display());
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
