//! Flatten WordprocessingML text, including text boxes, into plain lines.

use std::io::{Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, trace};
use zip::ZipArchive;

use super::{read_part, text_parts, Result, DOCUMENT_PART};
use crate::error::DocxError;

/// Extract the text of every header, the body and every footer.
///
/// Parts are separated by a newline. The main document part is mandatory;
/// headers and footers are optional.
pub fn extract_text<R: Read + Seek>(reader: R) -> Result<String> {
    let mut archive = ZipArchive::new(reader).map_err(|e| DocxError::Archive(e.to_string()))?;

    let mut text = String::new();
    for part in text_parts(&archive) {
        let xml = match read_part(&mut archive, &part) {
            Ok(xml) => xml,
            Err(DocxError::MissingPart(_)) if part != DOCUMENT_PART => continue,
            Err(e) => return Err(e),
        };
        let part_text = extract_text_from_xml(&xml).map_err(|reason| DocxError::Xml {
            part: part.clone(),
            reason,
        })?;
        trace!("{}: {} chars", part, part_text.len());

        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&part_text);
    }

    debug!("Extracted {} chars from DOCX", text.len());
    Ok(text)
}

/// Extract text from a single part's XML.
///
/// `w:t` runs are concatenated; paragraph ends, `w:br` and `w:cr` become
/// newlines and `w:tab` a tab. Text inside `w:txbxContent` is emitted where
/// the text box is anchored. The `mc:Fallback` branch of alternate content
/// repeats the text box for legacy readers and is skipped.
pub fn extract_text_from_xml(xml: &str) -> std::result::Result<String, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut text = String::new();
    let mut in_text = false;
    let mut fallback_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"mc:Fallback" => fallback_depth += 1,
                b"w:t" if fallback_depth == 0 => in_text = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"mc:Fallback" => fallback_depth = fallback_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                b"w:p" if fallback_depth == 0 => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) if fallback_depth == 0 => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let unescaped = t.unescape().map_err(|e| e.to_string())?;
                text.push_str(&unescaped);
            }
            Ok(Event::CData(c)) if in_text => {
                text.push_str(&String::from_utf8_lossy(&c));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "error at position {}: {}",
                    reader.error_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    Ok(text)
}
