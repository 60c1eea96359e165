//! Process command - generate flashcards from a single note image.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use notestudy_core::{Note, NoteProcessor};

use super::output::{format_flashcards, write_output, OutputFormat};
use super::{create_backend, load_config, RecognitionArgs};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input note image
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print the recognized text instead of flashcards
    #[arg(long)]
    show_text: bool,

    #[command(flatten)]
    recognition: RecognitionArgs,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.recognition.apply(&mut config);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing note: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );

    pb.set_message("Loading models...");
    let processor = NoteProcessor::new(create_backend(&config)?, &config);

    pb.set_message("Recognizing text...");
    let note = Note::from_path(&args.input)?;

    if args.show_text {
        let image = note
            .image
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Note has no image"))?;
        let text = processor.recognize_text(&image)?;
        pb.finish_and_clear();
        return write_output(&text, args.output.as_deref());
    }

    let cards = processor.process_note(&note).await?;
    pb.finish_and_clear();

    eprintln!(
        "{} Generated {} flashcards from {}",
        style("✓").green(),
        cards.len(),
        note.title
    );

    let output = format_flashcards(&cards, args.format)?;
    write_output(&output, args.output.as_deref())?;

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
