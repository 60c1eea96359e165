//! Extract command - generate flashcards from recognized text.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use notestudy_core::TextPipeline;

use super::load_config;
use super::output::{format_flashcards, write_output, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input text file, or "-" for stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Offer each sentence to the patterns on its own
    #[arg(long)]
    no_merge: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.no_merge {
        config.extraction.merge_question_answer = false;
    }

    let text = if args.input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        let path = PathBuf::from(&args.input);
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        std::fs::read_to_string(&path)?
    };

    let cards = TextPipeline::new(&config.extraction).generate_flashcards(&text, None);
    info!("Extracted {} flashcards", cards.len());

    if cards.is_empty() {
        eprintln!("{} No flashcards found", style("ℹ").blue());
    }

    let output = format_flashcards(&cards, args.format)?;
    write_output(&output, args.output.as_deref())
}
