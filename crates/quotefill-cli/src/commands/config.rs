//! Config command - inspect and edit the JSON configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;

use quotefill_core::QuoteFillConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Write here instead of the configuration path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one setting, e.g. "extraction.reference_label"
    Get { key: String },

    /// Change one existing setting
    Set { key: String, value: String },

    /// Print where the configuration file lives
    Path,
}

pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => {
            if !path.exists() {
                eprintln!("{} {} not found, showing defaults", style("ℹ").blue(), path.display());
            }
            println!("{}", serde_json::to_string_pretty(&read_config(&path)?)?);
        }
        ConfigCommand::Init { output, force } => {
            let target = output.unwrap_or(path);
            if target.exists() && !force {
                anyhow::bail!("{} already exists (use --force to replace it)", target.display());
            }
            write_config(&target, &QuoteFillConfig::default())?;
            println!("{} Wrote default configuration to {}", style("✓").green(), target.display());
        }
        ConfigCommand::Get { key } => {
            let value = read_config(&path)?.get(&key)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        ConfigCommand::Set { key, value } => {
            let mut config = read_config(&path)?;
            let stored = config.set(&key, &value)?;
            write_config(&path, &config)?;
            println!("{} {} = {}", style("✓").green(), key, stored);
        }
        ConfigCommand::Path => {
            println!("{}", path.display());
            if !path.exists() {
                println!(
                    "{} not created yet, run 'quotefill config init'",
                    style("ℹ").yellow()
                );
            }
        }
    }

    Ok(())
}

/// `<config dir>/quotefill/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quotefill")
        .join("config.json")
}

/// The file at `path`, or defaults when it does not exist yet.
fn read_config(path: &Path) -> anyhow::Result<QuoteFillConfig> {
    if !path.exists() {
        return Ok(QuoteFillConfig::default());
    }
    QuoteFillConfig::from_file(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_config(path: &Path, config: &QuoteFillConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    config
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
