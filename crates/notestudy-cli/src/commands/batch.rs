//! Batch processing command for multiple note images.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};
use uuid::Uuid;

use notestudy_core::{
    BatchCoordinator, BatchOutcome, CancellationToken, FlashcardDeck, Note, NoteProcessor,
    NoteStatus,
};

use super::output::{format_flashcards, load_deck, save_deck, write_output, OutputFormat};
use super::{create_backend, load_config, RecognitionArgs};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Deck file (JSON) to deduplicate against and append new cards to
    #[arg(short, long)]
    deck: Option<PathBuf>,

    /// Write the newly added cards here (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format for the newly added cards
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also write a per-note summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Number of notes processed at once (0 = unbounded)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Per-note timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(flatten)]
    recognition: RecognitionArgs,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.recognition.apply(&mut config);
    if let Some(jobs) = args.jobs {
        config.batch.max_concurrent_notes = jobs;
    }
    if let Some(timeout) = args.timeout {
        config.batch.note_timeout_ms = Some(timeout.saturating_mul(1000));
    }
    config.validate()?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(
                ext.to_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "tiff" | "tif" | "bmp" | "webp"
            )
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} notes to process",
        style("ℹ").blue(),
        files.len()
    );

    let notes = load_notes(&files);
    let paths: HashMap<Uuid, PathBuf> = notes
        .iter()
        .zip(files.iter())
        .map(|(note, path)| (note.id, path.clone()))
        .collect();

    let existing = match &args.deck {
        Some(path) => load_deck(path)?,
        None => Vec::new(),
    };
    debug!("Deck has {} existing flashcards", existing.len());
    let deck = FlashcardDeck::new(existing);

    let processor = NoteProcessor::new(create_backend(&config)?, &config);
    let coordinator = BatchCoordinator::new(processor, config.batch.clone());

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining notes");
            ctrl_c_cancel.cancel();
        }
    });

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Processing {} notes...", notes.len()));

    let outcome = coordinator.process_into_deck(notes, &deck, &cancel).await;

    pb.finish_and_clear();

    if let Some(path) = &args.deck {
        save_deck(path, &deck.into_cards())?;
        debug!("Wrote deck to {}", path.display());
    }

    if let Some(path) = &args.summary {
        write_summary(path, &outcome, &paths)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            path.display()
        );
    }

    let output = format_flashcards(&outcome.added, args.format)?;
    write_output(&output, args.output.as_deref())?;

    print_summary(&outcome, &paths, start.elapsed());

    Ok(())
}

/// Load note images. An unreadable image becomes a note with no payload.
fn load_notes(files: &[PathBuf]) -> Vec<Note> {
    files
        .iter()
        .map(|path| match Note::from_path(path) {
            Ok(note) => note,
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                let title = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Untitled note");
                Note::without_image(title)
            }
        })
        .collect()
}

fn describe(status: &NoteStatus) -> (&'static str, String) {
    match status {
        NoteStatus::Completed { cards } => ("success", cards.to_string()),
        NoteStatus::Failed { reason } => ("error", reason.clone()),
        NoteStatus::TimedOut => ("timeout", String::new()),
        NoteStatus::Cancelled => ("cancelled", String::new()),
    }
}

fn write_summary(
    path: &Path,
    outcome: &BatchOutcome,
    paths: &HashMap<Uuid, PathBuf>,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["filename", "note_id", "status", "cards", "error"])?;

    for report in &outcome.reports {
        let filename = paths
            .get(&report.note_id)
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let (status, detail) = describe(&report.status);
        let (cards, error) = match report.status {
            NoteStatus::Completed { .. } => (detail, String::new()),
            _ => (String::new(), detail),
        };

        wtr.write_record([
            filename,
            &report.note_id.to_string(),
            status,
            &cards,
            &error,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn print_summary(outcome: &BatchOutcome, paths: &HashMap<Uuid, PathBuf>, elapsed: Duration) {
    let failed = outcome.failed_count();

    eprintln!();
    eprintln!(
        "{} Processed {} notes in {:?}",
        style("✓").green(),
        outcome.reports.len(),
        elapsed
    );
    eprintln!(
        "   {} new flashcards, {} notes without results",
        style(outcome.added.len()).green(),
        style(failed).red()
    );

    if failed > 0 {
        eprintln!();
        eprintln!("{}", style("Notes without results:").red());
        for report in &outcome.reports {
            if matches!(report.status, NoteStatus::Completed { .. }) {
                continue;
            }
            let (status, detail) = describe(&report.status);
            let name = paths
                .get(&report.note_id)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| report.note_id.to_string());
            eprintln!("  - {}: {} {}", name, status, detail);
        }
    }
}
