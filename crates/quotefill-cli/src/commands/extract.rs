//! Extract command - show the fields found in a quotation.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use quotefill_core::{Field, FieldSet, FillPipeline};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Quotation to read (PDF or DOCX)
    #[arg(required = true)]
    source: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ExtractArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.source.exists() {
        anyhow::bail!("Source file not found: {}", args.source.display());
    }

    info!("Extracting fields from {}", args.source.display());

    let pipeline = FillPipeline::new(config)?;
    let result = pipeline.extract(&args.source)?;

    for warning in &result.warnings {
        eprintln!("{} {}", style("ℹ").blue(), warning);
    }

    let output = format_fields(&result.fields, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Render extracted fields in the requested format.
pub fn format_fields(fields: &FieldSet, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(fields)?),
        OutputFormat::Csv => format_csv(fields),
        OutputFormat::Text => Ok(format_text(fields)),
    }
}

fn format_csv(fields: &FieldSet) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(Field::ALL.iter().map(|f| f.as_str()))?;
    wtr.write_record(Field::ALL.iter().map(|f| fields.get(*f)))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(fields: &FieldSet) -> String {
    let mut output = String::new();

    output.push_str(&format!("Reference: {}\n", fields.reference));
    output.push_str(&format!("Date:      {}\n", fields.date));
    output.push_str(&format!("Amount:    {}\n", fields.amount_raw));
    output.push('\n');

    output.push_str("Customer:\n");
    output.push_str(&format!("  {}\n", fields.name));
    output.push_str(&format!("  {}\n", fields.address));

    output
}
