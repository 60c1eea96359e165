//! Flashcard output formats and deck files.

use std::fs;
use std::path::Path;

use console::style;

use notestudy_core::Flashcard;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (question,answer,source_note_id)
    Csv,
    /// Plain text Q/A listing
    Text,
}

/// Render flashcards in the requested format.
pub fn format_flashcards(cards: &[Flashcard], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(cards)?),
        OutputFormat::Csv => format_csv(cards),
        OutputFormat::Text => Ok(format_text(cards)),
    }
}

fn format_csv(cards: &[Flashcard]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["id", "question", "answer", "source_note_id"])?;
    for card in cards {
        wtr.write_record([
            card.id.to_string(),
            card.question.clone(),
            card.answer.clone(),
            card.source_note_id.map(|id| id.to_string()).unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(cards: &[Flashcard]) -> String {
    let mut output = String::new();

    for (i, card) in cards.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&format!("Q: {}\n", card.question));
        output.push_str(&format!("A: {}\n", card.answer));
    }

    output
}

/// Write to a file, or to stdout when no path is given.
pub fn write_output(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", content.trim_end()),
    }
    Ok(())
}

/// Read a deck file (a JSON array of flashcards). A missing file is an empty deck.
pub fn load_deck(path: &Path) -> anyhow::Result<Vec<Flashcard>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write a deck file.
pub fn save_deck(path: &Path, cards: &[Flashcard]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(cards)?)?;
    Ok(())
}
