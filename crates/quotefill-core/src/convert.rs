//! External fixed-layout conversion.
//!
//! Conversion runs a configured command such as Ghostscript or headless
//! LibreOffice. Arguments may use `{input}`, `{output}` and `{outdir}`.
//! Converters that only accept an output directory name the result after the
//! input file; that file is renamed to the requested output path.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::ConversionError;
use crate::models::config::{CommandSpec, ConversionConfig};
use crate::source::DocumentKind;

/// Runs one converter command.
#[derive(Debug, Clone)]
pub struct Converter {
    spec: CommandSpec,
}

impl Converter {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }

    /// The configured converter for outputs of the given kind.
    pub fn for_kind(config: &ConversionConfig, kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Pdf => Self::new(config.pdf.clone()),
            DocumentKind::Docx => Self::new(config.docx.clone()),
        }
    }

    pub fn program(&self) -> &str {
        &self.spec.program
    }

    fn args(&self, input: &Path, output: &Path, outdir: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        let outdir = outdir.to_string_lossy();
        self.spec
            .args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input)
                    .replace("{output}", &output)
                    .replace("{outdir}", &outdir)
            })
            .collect()
    }

    /// Convert `input` into `output`, returning the path written.
    pub fn convert(&self, input: &Path, output: &Path) -> Result<PathBuf, ConversionError> {
        let outdir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&outdir).map_err(|e| ConversionError::Spawn {
            program: self.spec.program.clone(),
            reason: format!("cannot create {}: {}", outdir.display(), e),
        })?;

        // Results left by an earlier run must not count as this run's output.
        let produced = named_after_input(input, &outdir);
        for stale in [output, produced.as_path()] {
            if stale != input && stale.exists() {
                debug!("Removing stale {}", stale.display());
                fs::remove_file(stale).map_err(|e| ConversionError::Spawn {
                    program: self.spec.program.clone(),
                    reason: format!("cannot remove {}: {}", stale.display(), e),
                })?;
            }
        }

        let args = self.args(input, output, &outdir);
        debug!("Running {} {}", self.spec.program, args.join(" "));

        let result = Command::new(&self.spec.program)
            .args(&args)
            .output()
            .map_err(|e| ConversionError::Spawn {
                program: self.spec.program.clone(),
                reason: e.to_string(),
            })?;

        if !result.status.success() {
            return Err(ConversionError::Failed {
                program: self.spec.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        if !output.exists() {
            if produced != output && produced != input && produced.exists() {
                debug!("Renaming {} to {}", produced.display(), output.display());
                fs::rename(&produced, output)
                    .map_err(|_| ConversionError::MissingOutput(output.to_path_buf()))?;
            }
        }

        if !output.exists() {
            return Err(ConversionError::MissingOutput(output.to_path_buf()));
        }

        info!("Converted {} to {}", input.display(), output.display());
        Ok(output.to_path_buf())
    }
}

/// `{outdir}/{input stem}.pdf`, where directory-based converters write.
fn named_after_input(input: &Path, outdir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    outdir.join(format!("{}.pdf", stem))
}
