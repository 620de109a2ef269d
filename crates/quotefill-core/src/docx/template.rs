//! Merge-field rendering for DOCX templates.
//!
//! Templates carry `{{ figureN }}` merge fields in their text. Word often
//! splits such a field across several runs, so the XML between the braces is
//! folded away before the part is handed to the template engine.

use std::io::{Cursor, Read, Seek, Write};

use handlebars::Handlebars;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::text_parts;
use crate::error::{DocxError, SubstitutionError};
use crate::models::FormattedFieldSet;

lazy_static! {
    static ref SPLIT_OPEN: Regex = Regex::new(r"\{(?:<[^>]*>)+\{").unwrap();
    static ref SPLIT_CLOSE: Regex = Regex::new(r"\}(?:<[^>]*>)+\}").unwrap();
    static ref MERGE_FIELD: Regex = Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap();
    static ref XML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Remove markup that Word inserted inside `{{ ... }}` merge fields.
pub fn fold_split_tags(xml: &str) -> String {
    let xml = SPLIT_OPEN.replace_all(xml, "{{");
    let xml = SPLIT_CLOSE.replace_all(&xml, "}}");
    MERGE_FIELD
        .replace_all(&xml, |caps: &regex::Captures| {
            format!("{{{{{}}}}}", XML_TAG.replace_all(&caps[1], ""))
        })
        .into_owned()
}

/// Render one XML part with the template engine.
///
/// Fields missing from `fields` render empty. Values are escaped by the
/// engine, which keeps `&`, `<` and `>` well-formed in XML.
pub fn render_xml(
    engine: &Handlebars<'_>,
    part: &str,
    xml: &str,
    fields: &FormattedFieldSet,
) -> std::result::Result<String, SubstitutionError> {
    engine
        .render_template(&fold_split_tags(xml), fields)
        .map_err(|e| SubstitutionError::Render {
            part: part.to_string(),
            reason: e.to_string(),
        })
}

/// Render every text part of a DOCX template and return the new archive.
///
/// Entries other than headers, the main document and footers are copied
/// unchanged, in their original order.
pub fn render_template<R: Read + Seek>(
    template: R,
    fields: &FormattedFieldSet,
) -> std::result::Result<Vec<u8>, RenderFailure> {
    let mut archive = ZipArchive::new(template).map_err(|e| DocxError::Archive(e.to_string()))?;
    let parts = text_parts(&archive);
    let engine = Handlebars::new();

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut rendered = 0;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| DocxError::Archive(e.to_string()))?;
        let name = entry.name().to_string();

        if entry.is_dir() {
            writer
                .add_directory(name.as_str(), options)
                .map_err(|e| SubstitutionError::Archive(e.to_string()))?;
            continue;
        }

        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| DocxError::Archive(format!("{}: {}", name, e)))?;

        if parts.contains(&name) {
            let xml = String::from_utf8(data).map_err(|e| DocxError::Xml {
                part: name.clone(),
                reason: e.to_string(),
            })?;
            data = render_xml(&engine, &name, &xml, fields)?.into_bytes();
            rendered += 1;
            trace!("Rendered {}", name);
        }

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| SubstitutionError::Archive(e.to_string()))?;
        writer
            .write_all(&data)
            .map_err(|e| SubstitutionError::Archive(format!("{}: {}", name, e)))?;
    }

    let output = writer
        .finish()
        .map_err(|e| SubstitutionError::Archive(e.to_string()))?
        .into_inner();

    debug!("Rendered {} DOCX parts", rendered);
    Ok(output)
}

/// Failure while rendering a DOCX template: either the template could not be
/// read or the substitution itself failed.
#[derive(Debug, thiserror::Error)]
pub enum RenderFailure {
    #[error(transparent)]
    Template(#[from] DocxError),

    #[error(transparent)]
    Substitution(#[from] SubstitutionError),
}
