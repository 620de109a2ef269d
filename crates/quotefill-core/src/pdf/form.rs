//! AcroForm field filling.

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use tracing::{debug, trace, warn};

use super::Result;
use crate::error::PdfError;
use crate::models::FormattedFieldSet;

/// Decode a PDF text string (UTF-16BE with BOM, otherwise PDFDocEncoding
/// approximated as Latin-1).
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Encode a value as a PDF text string: plain bytes for ASCII, UTF-16BE with
/// a byte order mark otherwise.
fn encode_text_string(value: &str) -> Vec<u8> {
    if value.is_ascii() {
        return value.as_bytes().to_vec();
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}

fn field_name(dict: &Dictionary) -> Option<String> {
    match dict.get(b"T").ok()? {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

/// Locate the AcroForm dictionary: its object id when indirect, or `None`
/// when it lives inline in the catalog.
fn acroform_location(doc: &Document) -> Option<(ObjectId, Option<ObjectId>)> {
    let root_id = doc.trailer.get(b"Root").ok()?.as_reference().ok()?;
    let catalog = doc.get_dictionary(root_id).ok()?;
    match catalog.get(b"AcroForm").ok()? {
        Object::Reference(id) => Some((root_id, Some(*id))),
        Object::Dictionary(_) => Some((root_id, None)),
        _ => None,
    }
}

fn acroform<'a>(doc: &'a Document) -> Option<&'a Dictionary> {
    let (root_id, form_id) = acroform_location(doc)?;
    match form_id {
        Some(id) => doc.get_dictionary(id).ok(),
        None => doc.get_dictionary(root_id).ok()?.get(b"AcroForm").ok()?.as_dict().ok(),
    }
}

/// A terminal form field.
struct FormField {
    id: ObjectId,
    /// Dotted name through every named ancestor.
    qualified: String,
    /// The field's own `/T`, or the nearest named ancestor's.
    partial: String,
}

/// Collect every terminal field. Each node is visited once, so `Kids` cycles
/// terminate.
fn collect_fields(doc: &Document) -> Vec<FormField> {
    let mut fields = Vec::new();
    let Some(form) = acroform(doc) else {
        return fields;
    };
    let Ok(roots) = form.get(b"Fields").and_then(Object::as_array) else {
        return fields;
    };

    let mut stack: Vec<(ObjectId, Option<(String, String)>)> = roots
        .iter()
        .rev()
        .filter_map(|o| o.as_reference().ok())
        .map(|id| (id, None))
        .collect();
    let mut visited = HashSet::new();

    while let Some((id, parent)) = stack.pop() {
        if !visited.insert(id) {
            warn!("Form field {:?} is referenced more than once, skipping", id);
            continue;
        }
        let Ok(dict) = doc.get_dictionary(id) else {
            continue;
        };
        let name = match (parent, field_name(dict)) {
            (Some((qualified, _)), Some(n)) => Some((format!("{}.{}", qualified, n), n)),
            (None, Some(n)) => Some((n.clone(), n)),
            (p, None) => p,
        };

        let kids: Vec<ObjectId> = dict
            .get(b"Kids")
            .and_then(Object::as_array)
            .map(|arr| arr.iter().filter_map(|o| o.as_reference().ok()).collect())
            .unwrap_or_default();

        let has_named_kids = kids.iter().any(|kid| {
            doc.get_dictionary(*kid)
                .map(|d| d.has(b"T"))
                .unwrap_or(false)
        });

        if has_named_kids {
            for kid in kids.into_iter().rev() {
                stack.push((kid, name.clone()));
            }
        } else if let Some((qualified, partial)) = name {
            fields.push(FormField {
                id,
                qualified,
                partial,
            });
        }
    }

    fields
}

/// Names of the fillable fields in the document's AcroForm.
pub fn form_field_names(doc: &Document) -> Vec<String> {
    collect_fields(doc)
        .into_iter()
        .map(|field| field.qualified)
        .collect()
}

/// Set `/V` on every form field whose qualified or partial name matches a
/// placeholder.
///
/// Viewers are asked to regenerate appearances (`NeedAppearances`); run the
/// output through a flattening converter for a static rendering. Returns the
/// number of fields filled.
pub fn fill_form_fields(doc: &mut Document, values: &FormattedFieldSet) -> Result<usize> {
    let fields = collect_fields(doc);
    if fields.is_empty() {
        debug!("Document has no form fields");
        return Ok(0);
    }

    let mut filled = 0;
    for field in fields {
        let Some(value) = values
            .get(&field.qualified)
            .or_else(|| values.get(&field.partial))
        else {
            trace!("No value for form field {}", field.qualified);
            continue;
        };
        let dict = doc
            .get_object_mut(field.id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfError::Parse(format!("form field {}: {}", field.qualified, e)))?;
        dict.set("V", Object::String(encode_text_string(value), StringFormat::Literal));
        filled += 1;
    }

    if filled > 0 {
        set_need_appearances(doc)?;
    }

    debug!("Filled {} form fields", filled);
    Ok(filled)
}

fn set_need_appearances(doc: &mut Document) -> Result<()> {
    let Some((root_id, form_id)) = acroform_location(doc) else {
        return Ok(());
    };

    let form = match form_id {
        Some(id) => doc.get_object_mut(id).and_then(Object::as_dict_mut),
        None => doc
            .get_object_mut(root_id)
            .and_then(Object::as_dict_mut)
            .and_then(|catalog| catalog.get_mut(b"AcroForm"))
            .and_then(Object::as_dict_mut),
    }
    .map_err(|e| PdfError::Parse(format!("AcroForm: {}", e)))?;

    form.set("NeedAppearances", true);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Placeholder;
    use crate::pdf::stream::tests::sample_document;
    use lopdf::dictionary;
    use pretty_assertions::assert_eq;

    fn add_form(doc: &mut Document, names: &[&str]) -> Vec<ObjectId> {
        let ids: Vec<ObjectId> = names
            .iter()
            .map(|name| {
                doc.add_object(dictionary! {
                    "FT" => "Tx",
                    "T" => Object::string_literal(*name),
                })
            })
            .collect();
        let form_id = doc.add_object(dictionary! {
            "Fields" => ids.iter().map(|id| Object::from(*id)).collect::<Vec<_>>(),
        });
        let root_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        doc.get_object_mut(root_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("AcroForm", form_id);
        ids
    }

    fn value_of(doc: &Document, id: ObjectId) -> Option<String> {
        match doc.get_dictionary(id).unwrap().get(b"V").ok()? {
            Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    #[test]
    fn test_fill_matching_fields() {
        let mut doc = sample_document(&["terms"]);
        let ids = add_form(&mut doc, &["figure1", "figure2", "signature"]);
        let values: FormattedFieldSet = [
            (Placeholder::Figure1, "AB_123".to_string()),
            (Placeholder::Figure2, "19/10/26".to_string()),
        ]
        .into_iter()
        .collect();

        let filled = fill_form_fields(&mut doc, &values).unwrap();

        assert_eq!(filled, 2);
        assert_eq!(value_of(&doc, ids[0]).as_deref(), Some("AB_123"));
        assert_eq!(value_of(&doc, ids[1]).as_deref(), Some("19/10/26"));
        assert_eq!(value_of(&doc, ids[2]), None);

        let form = acroform(&doc).unwrap();
        assert_eq!(form.get(b"NeedAppearances").unwrap().as_bool().unwrap(), true);
    }

    #[test]
    fn test_document_without_form() {
        let mut doc = sample_document(&["terms"]);
        let values = FormattedFieldSet::new();
        assert_eq!(fill_form_fields(&mut doc, &values).unwrap(), 0);
        assert!(form_field_names(&doc).is_empty());
    }

    #[test]
    fn test_nested_field_names() {
        let mut doc = sample_document(&["terms"]);
        let child = doc.add_object(dictionary! { "T" => Object::string_literal("ref") });
        let parent = doc.add_object(dictionary! {
            "T" => Object::string_literal("quote"),
            "Kids" => vec![Object::from(child)],
        });
        let form_id = doc.add_object(dictionary! { "Fields" => vec![Object::from(parent)] });
        let root_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        doc.get_object_mut(root_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("AcroForm", form_id);

        assert_eq!(form_field_names(&doc), vec!["quote.ref".to_string()]);
    }

    fn set_acroform(doc: &mut Document, fields: Vec<Object>) {
        let form_id = doc.add_object(dictionary! { "Fields" => fields });
        let root_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        doc.get_object_mut(root_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("AcroForm", form_id);
    }

    #[test]
    fn test_nested_field_filled_by_partial_name() {
        let mut doc = sample_document(&["terms"]);
        let child = doc.add_object(dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal("figure1"),
        });
        let parent = doc.add_object(dictionary! {
            "T" => Object::string_literal("quote"),
            "Kids" => vec![Object::from(child)],
        });
        set_acroform(&mut doc, vec![Object::from(parent)]);
        let values: FormattedFieldSet = [(Placeholder::Figure1, "AB_123".to_string())]
            .into_iter()
            .collect();

        assert_eq!(fill_form_fields(&mut doc, &values).unwrap(), 1);
        assert_eq!(value_of(&doc, child).as_deref(), Some("AB_123"));
    }

    #[test]
    fn test_self_referencing_kids_terminate() {
        let mut doc = sample_document(&["terms"]);
        let field = doc.new_object_id();
        doc.objects.insert(
            field,
            Object::Dictionary(dictionary! {
                "T" => Object::string_literal("a"),
                "Kids" => vec![Object::from(field)],
            }),
        );
        set_acroform(&mut doc, vec![Object::from(field)]);

        assert!(form_field_names(&doc).is_empty());
        assert_eq!(fill_form_fields(&mut doc, &FormattedFieldSet::new()).unwrap(), 0);
    }

    #[test]
    fn test_kids_cycle_through_ancestor() {
        let mut doc = sample_document(&["terms"]);
        let parent = doc.new_object_id();
        let child = doc.add_object(dictionary! {
            "T" => Object::string_literal("figure1"),
            "Kids" => vec![Object::from(parent)],
        });
        doc.objects.insert(
            parent,
            Object::Dictionary(dictionary! {
                "T" => Object::string_literal("quote"),
                "Kids" => vec![Object::from(child)],
            }),
        );
        set_acroform(&mut doc, vec![Object::from(parent)]);

        assert!(form_field_names(&doc).is_empty());
    }

    #[test]
    fn test_utf16_field_name() {
        assert_eq!(decode_text_string(&[0xFE, 0xFF, 0x00, b'f', 0x00, b'1']), "f1");
        assert_eq!(decode_text_string(b"figure1"), "figure1");
    }

    #[test]
    fn test_non_ascii_value_round_trips() {
        let encoded = encode_text_string("£400");
        assert_eq!(&encoded[..2], &[0xFE, 0xFF]);
        assert_eq!(decode_text_string(&encoded), "£400");
        assert_eq!(encode_text_string("AB_123"), b"AB_123".to_vec());
    }
}
