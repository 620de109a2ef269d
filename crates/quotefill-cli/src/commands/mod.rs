//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod extract;
pub mod fill;

use std::path::Path;

use anyhow::Context;
use quotefill_core::prompt::{DatePrompt, PresetPrompt, TerminalPrompt};
use quotefill_core::{QuoteFillConfig, SubstitutionMode};
use tracing::debug;

/// Substitution strategy selectable on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ModeArg {
    /// DOCX merge fields for DOCX templates, content and form for PDFs
    Auto,
    /// Literal tokens in PDF content streams
    Content,
    /// PDF form fields named after placeholders
    Form,
    /// DOCX merge fields
    Docx,
}

impl From<ModeArg> for SubstitutionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => SubstitutionMode::Auto,
            ModeArg::Content => SubstitutionMode::Content,
            ModeArg::Form => SubstitutionMode::Form,
            ModeArg::Docx => SubstitutionMode::Docx,
        }
    }
}

/// Load the configuration from `--config`, else from the default location,
/// else use defaults.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<QuoteFillConfig> {
    if let Some(path) = config_path {
        return QuoteFillConfig::from_file(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()));
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        return QuoteFillConfig::from_file(&default_path)
            .with_context(|| format!("Failed to read config file: {}", default_path.display()));
    }

    Ok(QuoteFillConfig::default())
}

/// Answers from command-line flags first, then from the terminal when
/// interactive. Terminal prompts suspend the progress bar while they wait.
pub struct CliPrompt {
    preset: PresetPrompt,
    terminal: Option<TerminalPrompt>,
    progress: Option<indicatif::ProgressBar>,
}

impl CliPrompt {
    pub fn new(preset: PresetPrompt, interactive: bool) -> Self {
        Self {
            preset,
            terminal: interactive.then(TerminalPrompt::new),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: indicatif::ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl DatePrompt for CliPrompt {
    fn prompt_for_date(&mut self, label: &str) -> Option<String> {
        if let Some(answer) = self.preset.prompt_for_date(label) {
            return Some(answer);
        }
        let terminal = self.terminal.as_mut()?;
        match &self.progress {
            Some(progress) => progress.suspend(|| terminal.prompt_for_date(label)),
            None => terminal.prompt_for_date(label),
        }
    }
}
