//! DOCX (WordprocessingML) text extraction and template rendering.

mod reader;
mod template;

pub use reader::{extract_text, extract_text_from_xml};
pub use template::{fold_split_tags, render_template, render_xml, RenderFailure};

use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::error::DocxError;

/// Result type for DOCX operations.
pub type Result<T> = std::result::Result<T, DocxError>;

/// Main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Parts that carry user-visible text, in reading order: headers, the main
/// document, then footers.
pub(crate) fn text_parts<R: Read + Seek>(archive: &ZipArchive<R>) -> Vec<String> {
    let mut headers = Vec::new();
    let mut footers = Vec::new();

    for name in archive.file_names() {
        if is_numbered_part(name, "word/header") {
            headers.push(name.to_string());
        } else if is_numbered_part(name, "word/footer") {
            footers.push(name.to_string());
        }
    }
    headers.sort_by_key(|n| part_number(n));
    footers.sort_by_key(|n| part_number(n));

    let mut parts = headers;
    parts.push(DOCUMENT_PART.to_string());
    parts.extend(footers);
    parts
}

fn is_numbered_part(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(".xml"))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

fn part_number(name: &str) -> u32 {
    name.trim_start_matches(|c: char| !c.is_ascii_digit())
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(0)
}

/// Read a part as UTF-8 text.
pub(crate) fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive
        .by_name(name)
        .map_err(|_| DocxError::MissingPart(name.to_string()))?;
    let mut content = String::new();
    file.read_to_string(&mut content).map_err(|e| DocxError::Xml {
        part: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(content)
}
