//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;
pub mod output;
pub mod process;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use notestudy_core::models::config::{NoteStudyConfig, RecognitionAccuracy};
use notestudy_core::{PureOcrEngine, RecognitionBackend};

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notestudy")
        .join("config.json")
}

/// Load the given (or default) config file; defaults when it does not exist yet.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<NoteStudyConfig> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    let config = if path.exists() {
        debug!("Using config from {}", path.display());
        NoteStudyConfig::from_file(&path)?
    } else {
        NoteStudyConfig::default()
    };

    config.validate()?;
    Ok(config)
}

/// Recognition overrides accepted by the image commands.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct RecognitionArgs {
    /// Model root directory (containing mobile/ and server/)
    #[arg(short, long)]
    pub model_dir: Option<PathBuf>,

    /// Use the fast (mobile) models instead of the accurate ones
    #[arg(long)]
    pub fast: bool,

    /// Skip lexical cleanup of recognized lines
    #[arg(long)]
    pub no_autocorrect: bool,
}

impl RecognitionArgs {
    /// Apply the overrides to a loaded configuration.
    pub fn apply(&self, config: &mut NoteStudyConfig) {
        if let Some(dir) = &self.model_dir {
            config.models.model_dir = dir.clone();
        }
        if self.fast {
            config.ocr.accuracy = RecognitionAccuracy::Fast;
        }
        if self.no_autocorrect {
            config.ocr.autocorrect = false;
        }
    }
}

/// Load the OCR engine for the configured accuracy level.
pub fn create_backend(config: &NoteStudyConfig) -> anyhow::Result<Arc<dyn RecognitionBackend>> {
    let engine = PureOcrEngine::for_accuracy(&config.models, config.ocr.accuracy).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load OCR models from {}: {}",
            config.model_variant_dir().display(),
            e
        )
    })?;
    Ok(Arc::new(engine))
}
