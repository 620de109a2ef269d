//! Literal placeholder replacement inside page content streams.
//!
//! Content streams are treated as Latin-1 text: every byte maps to exactly one
//! `char`, so decoding never fails and unchanged bytes survive the round trip.
//! Tokens split across text operators are not found.

use lopdf::{Document, Object};
use tracing::{debug, trace, warn};

use super::Result;
use crate::error::PdfError;
use crate::models::FormattedFieldSet;
use crate::substitute::replace_tokens;

/// Character written in place of anything outside Latin-1.
const REPLACEMENT_BYTE: u8 = b'?';

/// Counters from a content-stream pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamReport {
    /// Pages visited.
    pub pages: usize,
    /// Content streams that contained at least one token.
    pub streams_rewritten: usize,
    /// Tokens replaced across all streams.
    pub replacements: usize,
    /// Characters that could not be encoded and were replaced with `?`.
    pub unencodable_chars: usize,
}

/// Decode bytes as Latin-1.
pub fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode a string as Latin-1, returning the bytes and the number of
/// characters that had to be replaced.
pub fn latin1_encode(text: &str) -> (Vec<u8>, usize) {
    let mut lost = 0;
    let bytes = text
        .chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(b) => b,
            Err(_) => {
                lost += 1;
                REPLACEMENT_BYTE
            }
        })
        .collect();
    (bytes, lost)
}

/// Replace placeholder tokens in every content stream of every page.
///
/// Streams are processed independently, in page order and then in the order
/// the page lists them. Streams without tokens are left untouched; rewritten
/// streams are stored uncompressed with an updated `Length`.
pub fn replace_in_content_streams(
    doc: &mut Document,
    fields: &FormattedFieldSet,
) -> Result<StreamReport> {
    let mut report = StreamReport::default();

    for (page_number, page_id) in doc.get_pages() {
        report.pages += 1;

        for stream_id in doc.get_page_contents(page_id) {
            let stream = doc
                .get_object_mut(stream_id)
                .and_then(Object::as_stream_mut)
                .map_err(|e| PdfError::Parse(format!("content stream {:?}: {}", stream_id, e)))?;

            let data = if stream.dict.has(b"Filter") {
                match stream.decompressed_content() {
                    Ok(data) => data,
                    Err(e) => {
                        warn!(
                            "Skipping undecodable content stream {:?} on page {}: {}",
                            stream_id, page_number, e
                        );
                        continue;
                    }
                }
            } else {
                stream.content.clone()
            };

            let (replaced, count) = replace_tokens(&latin1_decode(&data), fields);
            if count == 0 {
                trace!("No tokens in stream {:?} on page {}", stream_id, page_number);
                continue;
            }

            let (bytes, lost) = latin1_encode(&replaced);
            if lost > 0 {
                debug!(
                    "{} characters outside Latin-1 replaced in stream {:?}",
                    lost, stream_id
                );
            }

            stream.set_plain_content(bytes);
            report.streams_rewritten += 1;
            report.replacements += count;
            report.unencodable_chars += lost;
        }
    }

    debug!(
        "Content streams: {} pages, {} streams rewritten, {} replacements",
        report.pages, report.streams_rewritten, report.replacements
    );

    Ok(report)
}
