//! Configuration structures for the fill pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QuoteFillError;
use crate::substitute::SubstitutionMode;

/// Main configuration for the quotefill pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteFillConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Field formatting configuration.
    pub formatting: FormattingConfig,

    /// Template substitution configuration.
    pub substitution: SubstitutionConfig,

    /// External converter configuration.
    pub conversion: ConversionConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Label preceding the reference code (without the colon).
    pub reference_label: String,

    /// Label preceding the document date (without the colon).
    pub date_label: String,

    /// Currency symbol that prefixes amounts.
    pub currency_symbol: String,

    /// Substrings marking the contact line that anchors the name/address scan.
    pub contact_markers: Vec<String>,

    /// Maximum number of address lines collected after the name.
    pub max_address_lines: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            reference_label: "Quote Ref".to_string(),
            date_label: "Date".to_string(),
            currency_symbol: "£".to_string(),
            contact_markers: vec!["@".to_string(), "www.".to_string()],
            max_address_lines: 2,
        }
    }
}

/// Field formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingConfig {
    /// Currency unit names used when spelling out amounts.
    pub currency: CurrencyNames,

    /// chrono format string for the short date fallback.
    pub short_date_format: String,

    /// Word placed before the long ordinal date.
    pub long_date_prefix: String,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyNames::default(),
            short_date_format: "%d/%m/%y".to_string(),
            long_date_prefix: "dated".to_string(),
        }
    }
}

/// Singular and plural names of a currency's major and minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyNames {
    pub major_singular: String,
    pub major_plural: String,
    pub minor_singular: String,
    pub minor_plural: String,
}

impl Default for CurrencyNames {
    fn default() -> Self {
        Self {
            major_singular: "pound".to_string(),
            major_plural: "pounds".to_string(),
            minor_singular: "penny".to_string(),
            minor_plural: "pence".to_string(),
        }
    }
}

/// Template substitution configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionConfig {
    /// Strategy used to fill the template.
    pub mode: SubstitutionMode,
}

/// External converter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Command used to convert filled PDF templates (flattening).
    pub pdf: CommandSpec,

    /// Command used to convert filled DOCX templates to PDF.
    pub docx: CommandSpec,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            pdf: CommandSpec::ghostscript(),
            docx: CommandSpec::libreoffice(),
        }
    }
}

/// A converter command line.
///
/// Arguments may contain `{input}`, `{output}` and `{outdir}`, which are
/// replaced with the corresponding paths before the process is spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Executable name or path.
    pub program: String,

    /// Argument template.
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Ghostscript `pdfwrite` in batch mode.
    pub fn ghostscript() -> Self {
        Self {
            program: "gs".to_string(),
            args: vec![
                "-dBATCH".to_string(),
                "-dNOPAUSE".to_string(),
                "-dQUIET".to_string(),
                "-sDEVICE=pdfwrite".to_string(),
                "-sOutputFile={output}".to_string(),
                "{input}".to_string(),
            ],
        }
    }

    /// Headless LibreOffice PDF export.
    pub fn libreoffice() -> Self {
        Self {
            program: "soffice".to_string(),
            args: vec![
                "--headless".to_string(),
                "--convert-to".to_string(),
                "pdf".to_string(),
                "--outdir".to_string(),
                "{outdir}".to_string(),
                "{input}".to_string(),
            ],
        }
    }
}

impl QuoteFillConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Read a setting by dotted key, e.g. `extraction.reference_label`.
    pub fn get(&self, key: &str) -> Result<Value, QuoteFillError> {
        let mut tree = self.to_tree()?;
        Ok(setting_mut(&mut tree, key)?.take())
    }

    /// Change an existing setting by dotted key and return the stored value.
    ///
    /// `raw` is read as JSON when the setting is not a string; string
    /// settings take `raw` verbatim unless it is a quoted JSON string. The
    /// whole configuration is re-validated, so a value of the wrong shape
    /// leaves `self` untouched.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<Value, QuoteFillError> {
        let mut tree = self.to_tree()?;
        let slot = setting_mut(&mut tree, key)?;
        let value = match (&*slot, serde_json::from_str::<Value>(raw)) {
            (Value::String(_), Ok(Value::String(s))) => Value::String(s),
            (Value::String(_), _) => Value::String(raw.to_string()),
            (_, Ok(parsed)) => parsed,
            (_, Err(_)) => Value::String(raw.to_string()),
        };
        *slot = value.clone();

        *self = serde_json::from_value(tree)
            .map_err(|e| QuoteFillError::Config(format!("invalid value for {}: {}", key, e)))?;
        Ok(value)
    }

    fn to_tree(&self) -> Result<Value, QuoteFillError> {
        serde_json::to_value(self).map_err(|e| QuoteFillError::Config(e.to_string()))
    }
}

/// The node at a dotted key. Only keys the configuration already has resolve.
fn setting_mut<'a>(tree: &'a mut Value, key: &str) -> Result<&'a mut Value, QuoteFillError> {
    let mut current = tree;
    for part in key.split('.') {
        current = current
            .get_mut(part)
            .ok_or_else(|| QuoteFillError::Config(format!("unknown configuration key: {}", key)))?;
    }
    Ok(current)
}
