//! Batch command - fill one template from many quotations.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use quotefill_core::prompt::{PresetPrompt, PROPOSED_WEEK_LABEL, WORKS_WEEK_LABEL};
use quotefill_core::{DocumentKind, FillPipeline, FillReport, FillRequest};

use super::fill::default_converted_path;
use super::{load_config, ModeArg};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Source files glob pattern
    #[arg(required = true)]
    input: String,

    /// Template with placeholders (PDF or DOCX)
    #[arg(required = true)]
    template: PathBuf,

    /// Output directory
    #[arg(short = 'd', long)]
    output_dir: PathBuf,

    /// Substitution mode (overrides the config file)
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Convert every filled template with the configured converter
    #[arg(long)]
    convert: bool,

    /// Proposed week commencing for every source (DD/MM/YY)
    #[arg(long)]
    proposed_week: Option<String>,

    /// Works week commencing for every source (DD/MM/YY)
    #[arg(long)]
    works_week: Option<String>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of filling from a single source.
struct FillResult {
    path: PathBuf,
    report: Option<FillReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub fn run(args: BatchArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(mode) = args.mode {
        config.substitution.mode = mode.into();
    }

    if !args.template.exists() {
        anyhow::bail!("Template file not found: {}", args.template.display());
    }

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| DocumentKind::from_extension(p).is_some())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    fs::create_dir_all(&args.output_dir)?;

    let pipeline = FillPipeline::new(config)?;
    let extension = args
        .template
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("pdf")
        .to_lowercase();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    let names = output_names(&files, &extension);

    for (path, name) in files.into_iter().zip(names) {
        let file_start = Instant::now();

        let output = args.output_dir.join(name);
        let mut request = FillRequest::new(&path, &args.template).with_output(&output);
        if args.convert {
            request = request.with_conversion(default_converted_path(&output));
        }

        let mut prompt = PresetPrompt::new()
            .with_optional_answer(PROPOSED_WEEK_LABEL, args.proposed_week.clone())
            .with_optional_answer(WORKS_WEEK_LABEL, args.works_week.clone());

        let result = pipeline.run(&request, &mut prompt);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(report) => {
                debug!("Wrote {}", report.output.display());
                if let Some(e) = &report.conversion_error {
                    warn!("Conversion failed for {}: {}", path.display(), e);
                }
                results.push(FillResult {
                    path,
                    report: Some(report),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(FillResult {
                        path,
                        report: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    pb.abandon();
                    anyhow::bail!("Processing {} failed: {}", path.display(), error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let successful = results.iter().filter(|r| r.report.is_some()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if args.summary {
        let summary_path = args.output_dir.join("summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn source_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("quote")
        .to_string()
}

/// One distinct output file name per source. Sources sharing a stem get
/// their own extension appended; any clash left after that gets a number.
fn output_names(files: &[PathBuf], extension: &str) -> Vec<String> {
    let mut stems: HashMap<String, usize> = HashMap::new();
    for file in files {
        *stems.entry(source_stem(file)).or_default() += 1;
    }

    let mut taken = HashSet::new();
    files
        .iter()
        .map(|file| {
            let mut base = source_stem(file);
            if stems[&base] > 1 {
                if let Some(ext) = file.extension().and_then(|e| e.to_str()) {
                    base = format!("{}_{}", base, ext.to_lowercase());
                }
            }

            let mut name = format!("{}.{}", base, extension);
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{}_{}.{}", base, n, extension);
                n += 1;
            }
            name
        })
        .collect()
}

fn write_summary(path: &Path, results: &[FillResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "reference",
        "amount",
        "name",
        "output",
        "converted",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(report) = &result.report {
            let converted = match (&report.converted, &report.conversion_error) {
                (Some(path), _) => path.display().to_string(),
                (None, Some(e)) => format!("failed: {}", e),
                (None, None) => String::new(),
            };
            wtr.write_record([
                filename,
                "success",
                &report.fields.reference,
                &report.fields.amount_raw,
                &report.fields.name,
                &report.output.display().to_string(),
                &converted,
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
