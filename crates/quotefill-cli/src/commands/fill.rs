//! Fill command - fill a template from a single quotation.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use quotefill_core::prompt::{PresetPrompt, PROPOSED_WEEK_LABEL, WORKS_WEEK_LABEL};
use quotefill_core::{FillPipeline, FillReport, FillRequest, Placeholder};

use super::{load_config, CliPrompt, ModeArg};

/// Arguments for the fill command.
#[derive(Args)]
pub struct FillArgs {
    /// Quotation to read fields from (PDF or DOCX)
    #[arg(required = true)]
    source: PathBuf,

    /// Template with placeholders (PDF or DOCX)
    #[arg(required = true)]
    template: PathBuf,

    /// Output file (default: final_output.<ext> next to the template)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Convert the filled template with the configured converter, optionally
    /// to the given path (--convert=PATH)
    #[arg(long, num_args = 0..=1, require_equals = true, value_name = "PATH")]
    convert: Option<Option<PathBuf>>,

    /// Substitution mode (overrides the config file)
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Proposed week commencing (DD/MM/YY)
    #[arg(long)]
    proposed_week: Option<String>,

    /// Works week commencing (DD/MM/YY)
    #[arg(long)]
    works_week: Option<String>,

    /// Ask for dates not given on the command line
    #[arg(short, long)]
    interactive: bool,

    /// Date to use as today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
}

/// Where the converted file goes when `--convert` is given without a path.
pub fn default_converted_path(output: &Path) -> PathBuf {
    let is_pdf = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
        output.with_file_name(format!("{}_flat.pdf", stem))
    } else {
        output.with_extension("pdf")
    }
}

pub fn run(args: FillArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(mode) = args.mode {
        config.substitution.mode = mode.into();
    }

    if !args.source.exists() {
        anyhow::bail!("Source file not found: {}", args.source.display());
    }
    if !args.template.exists() {
        anyhow::bail!("Template file not found: {}", args.template.display());
    }

    let mut request = FillRequest::new(&args.source, &args.template);
    if let Some(output) = &args.output {
        request = request.with_output(output);
    }
    if let Some(convert) = &args.convert {
        let target = convert
            .clone()
            .unwrap_or_else(|| default_converted_path(&request.output));
        request = request.with_conversion(target);
    }

    let mut pipeline = FillPipeline::new(config)?;
    if let Some(today) = args.today {
        pipeline = pipeline.with_today(today);
    }

    info!("Filling {} from {}", args.template.display(), args.source.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );
    pb.set_message("Extracting fields and filling template...");
    pb.set_position(10);

    let preset = PresetPrompt::new()
        .with_optional_answer(PROPOSED_WEEK_LABEL, args.proposed_week.clone())
        .with_optional_answer(WORKS_WEEK_LABEL, args.works_week.clone());
    let mut prompt = CliPrompt::new(preset, args.interactive).with_progress(pb.clone());

    let report = match pipeline.run(&request, &mut prompt) {
        Ok(report) => report,
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e.into());
        }
    };

    pb.set_position(100);
    pb.finish_with_message("Done");

    print_report(&report);

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_report(report: &FillReport) {
    println!(
        "{} Output written to {}",
        style("✓").green(),
        report.output.display()
    );

    if let Some(converted) = &report.converted {
        println!(
            "{} Converted output written to {}",
            style("✓").green(),
            converted.display()
        );
    }
    if let Some(error) = &report.conversion_error {
        eprintln!(
            "{} Conversion failed, filled template kept: {}",
            style("⚠").yellow(),
            error
        );
    }

    for warning in &report.warnings {
        eprintln!("{} {}", style("ℹ").blue(), warning);
    }

    println!();
    println!("Used placeholders:");
    for placeholder in Placeholder::ALL {
        let value = report.placeholders.get(placeholder.name()).unwrap_or_default();
        println!("  {:<9} {}", style(placeholder.name()).cyan(), value);
    }
}
