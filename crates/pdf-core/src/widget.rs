//! AcroForm widget annotation discovery and removal
//!
//! Interactive form templates carry their fillable regions as widget
//! annotations in each page's /Annots array. This module reads those
//! annotations into owned [`WidgetInfo`] values (qualified field name plus
//! rectangle) and strips them from the document, which is the mechanism
//! behind flattening: capture the geometry first, delete the interactivity,
//! then draw static content in its place.

use crate::Result;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Reference chains in malformed documents can cycle
const MAX_REF_DEPTH: usize = 10;

/// Field hierarchies deeper than this are treated as malformed
const MAX_PARENT_DEPTH: usize = 10;

/// A rectangle in PDF coordinates (origin bottom-left), normalized so that
/// `x0 <= x1` and `y0 <= y1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// A widget annotation captured from a template page
///
/// The rectangle is an owned copy, so it stays valid after the annotation
/// itself has been removed from the document.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetInfo {
    /// Fully qualified field name (parent names joined with '.')
    pub field_name: String,
    /// Annotation rectangle in PDF coordinates
    pub rect: Rect,
}

/// Follow reference chains to the underlying object
fn resolve<'a>(doc: &'a Document, mut obj: &'a Object) -> &'a Object {
    let mut depth = 0;
    while let Object::Reference(id) = obj {
        if depth >= MAX_REF_DEPTH {
            break;
        }
        match doc.objects.get(id) {
            Some(next) => obj = next,
            None => break,
        }
        depth += 1;
    }
    obj
}

/// Decode a PDF text string
///
/// Real-world templates store field names either as UTF-16BE with a BOM or
/// as PDFDoc/Latin-1 bytes. Anything else decodes lossily rather than
/// failing the whole page scan.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

fn is_widget(dict: &Dictionary) -> bool {
    dict.get(b"Subtype")
        .ok()
        .and_then(|obj| obj.as_name().ok())
        .map(|name| name == b"Widget")
        .unwrap_or(false)
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn string_value(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match resolve(doc, dict.get(key).ok()?) {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        _ => None,
    }
}

fn widget_rect(doc: &Document, dict: &Dictionary) -> Option<Rect> {
    let arr = resolve(doc, dict.get(b"Rect").ok()?).as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let x0 = number(resolve(doc, &arr[0]))?;
    let y0 = number(resolve(doc, &arr[1]))?;
    let x1 = number(resolve(doc, &arr[2]))?;
    let y1 = number(resolve(doc, &arr[3]))?;
    Some(Rect::new(x0, y0, x1, y1))
}

/// Resolve the fully qualified field name of a widget annotation
///
/// Widgets either carry /T themselves or inherit it from a parent field
/// dictionary chain; ancestor names prefix the widget's own, joined with '.'.
fn qualified_field_name(doc: &Document, dict: &Dictionary) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(name) = string_value(doc, dict, b"T") {
        parts.push(name);
    }

    let mut parent = dict.get(b"Parent").ok().cloned();
    let mut depth = 0;
    while let Some(obj) = parent {
        if depth >= MAX_PARENT_DEPTH {
            break;
        }
        let parent_dict = match resolve(doc, &obj).as_dict() {
            Ok(d) => d.clone(),
            Err(_) => break,
        };
        if let Some(name) = string_value(doc, &parent_dict, b"T") {
            parts.insert(0, name);
        }
        parent = parent_dict.get(b"Parent").ok().cloned();
        depth += 1;
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

/// Collect all named widget annotations on a page
///
/// Nameless widgets and entries without a usable /Rect are skipped; broken
/// references are ignored. The scan never mutates the document, so calling
/// it twice yields the same result.
pub fn collect_widgets(doc: &Document, page_id: ObjectId) -> Result<Vec<WidgetInfo>> {
    let page_dict = doc.get_object(page_id)?.as_dict()?;

    let annots = match page_dict.get(b"Annots") {
        Ok(obj) => resolve(doc, obj),
        Err(_) => return Ok(Vec::new()),
    };
    let entries = match annots.as_array() {
        Ok(arr) => arr,
        Err(_) => return Ok(Vec::new()),
    };

    let mut widgets = Vec::new();
    for entry in entries {
        let dict = match resolve(doc, entry).as_dict() {
            Ok(d) => d,
            Err(_) => continue,
        };
        if !is_widget(dict) {
            continue;
        }
        let rect = match widget_rect(doc, dict) {
            Some(r) => r,
            None => continue,
        };
        let field_name = match qualified_field_name(doc, dict) {
            Some(n) => n,
            None => {
                log::debug!("skipping widget without a field name");
                continue;
            }
        };
        widgets.push(WidgetInfo { field_name, rect });
    }

    Ok(widgets)
}

/// Remove every widget annotation from a page
///
/// Non-widget annotations (links, notes) survive. Broken references are
/// dropped from /Annots without counting as removed widgets. Returns the
/// number of widgets removed.
pub fn strip_widgets(doc: &mut Document, page_id: ObjectId) -> Result<usize> {
    let entries: Vec<Object> = {
        let page_dict = doc.get_object(page_id)?.as_dict()?;
        match page_dict.get(b"Annots") {
            Ok(obj) => match resolve(doc, obj).as_array() {
                Ok(arr) => arr.clone(),
                Err(_) => return Ok(0),
            },
            Err(_) => return Ok(0),
        }
    };

    let mut kept: Vec<Object> = Vec::new();
    let mut removed_ids: Vec<ObjectId> = Vec::new();
    let mut removed = 0usize;

    for entry in entries {
        let resolved = resolve(doc, &entry);
        match resolved.as_dict() {
            Ok(dict) => {
                if is_widget(dict) {
                    removed += 1;
                    if let Object::Reference(id) = entry {
                        removed_ids.push(id);
                    }
                } else {
                    kept.push(entry);
                }
            }
            // Broken reference: drop it from the array
            Err(_) => {
                if !matches!(entry, Object::Reference(_)) {
                    kept.push(entry);
                }
            }
        }
    }

    {
        let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
        if kept.is_empty() {
            page_dict.remove(b"Annots");
        } else {
            page_dict.set("Annots", Object::Array(kept));
        }
    }

    for id in removed_ids {
        doc.objects.remove(&id);
    }

    Ok(removed)
}

/// Remove the interactive form dictionary from the document catalog
///
/// Returns true if an /AcroForm entry was present and removed.
pub fn remove_acroform(doc: &mut Document) -> bool {
    let catalog_id = match doc.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => *id,
        _ => return false,
    };
    match doc.get_object_mut(catalog_id) {
        Ok(Object::Dictionary(catalog)) => catalog.remove(b"AcroForm").is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Build a one-page document with the given annotation dictionaries
    fn doc_with_annots(annots: Vec<Dictionary>) -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let annot_refs: Vec<Object> = annots
            .into_iter()
            .map(|dict| Object::Reference(doc.add_object(dict)))
            .collect();

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Annots" => annot_refs,
        });

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "AcroForm" => dictionary! { "Fields" => Object::Array(vec![]) },
        });
        doc.trailer.set("Root", catalog_id);

        (doc, page_id)
    }

    fn widget(name: &str, rect: [f64; 4]) -> Dictionary {
        dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::string_literal(name),
            "Rect" => rect.iter().map(|v| (*v as f32).into()).collect::<Vec<Object>>(),
        }
    }

    #[test]
    fn test_collect_named_widgets() {
        let (doc, page_id) = doc_with_annots(vec![
            widget("f1", [50.0, 700.0, 250.0, 720.0]),
            widget("f2", [50.0, 650.0, 250.0, 670.0]),
        ]);

        let widgets = collect_widgets(&doc, page_id).unwrap();
        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets[0].field_name, "f1");
        assert_eq!(widgets[1].field_name, "f2");
        assert!((widgets[0].rect.width() - 200.0).abs() < 0.01);
        assert!((widgets[0].rect.height() - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_collect_is_repeatable() {
        let (doc, page_id) = doc_with_annots(vec![widget("f1", [0.0, 0.0, 10.0, 10.0])]);

        let first = collect_widgets(&doc, page_id).unwrap();
        let second = collect_widgets(&doc, page_id).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_collect_skips_non_widget_annots() {
        let link = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        };
        let (doc, page_id) = doc_with_annots(vec![link, widget("f1", [0.0, 0.0, 10.0, 10.0])]);

        let widgets = collect_widgets(&doc, page_id).unwrap();
        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets[0].field_name, "f1");
    }

    #[test]
    fn test_collect_skips_nameless_widget() {
        let nameless = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        };
        let (doc, page_id) = doc_with_annots(vec![nameless]);

        assert!(collect_widgets(&doc, page_id).unwrap().is_empty());
    }

    #[test]
    fn test_collect_page_without_annots() {
        let (mut doc, page_id) = doc_with_annots(vec![]);
        // Remove the empty array entirely
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .remove(b"Annots");

        assert!(collect_widgets(&doc, page_id).unwrap().is_empty());
    }

    #[test]
    fn test_parent_chain_name() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let parent_id = doc.add_object(dictionary! {
            "T" => Object::string_literal("address"),
            "FT" => "Tx",
        });
        let widget_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "T" => Object::string_literal("city"),
            "Parent" => parent_id,
            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        });

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Annots" => vec![Object::Reference(widget_id)],
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let widgets = collect_widgets(&doc, page_id).unwrap();
        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets[0].field_name, "address.city");
    }

    #[test]
    fn test_utf16be_field_name() {
        let mut name_bytes = vec![0xFE, 0xFF];
        for unit in "név".encode_utf16() {
            name_bytes.extend_from_slice(&unit.to_be_bytes());
        }
        let w = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "T" => Object::String(name_bytes, lopdf::StringFormat::Hexadecimal),
            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        };
        let (doc, page_id) = doc_with_annots(vec![w]);

        let widgets = collect_widgets(&doc, page_id).unwrap();
        assert_eq!(widgets[0].field_name, "név");
    }

    #[test]
    fn test_rect_normalization() {
        // Rect given with swapped corners
        let (doc, page_id) = doc_with_annots(vec![widget("f1", [250.0, 720.0, 50.0, 700.0])]);

        let rect = collect_widgets(&doc, page_id).unwrap()[0].rect;
        assert_eq!(rect.x0, 50.0);
        assert_eq!(rect.y0, 700.0);
        assert!(rect.width() > 0.0);
        assert!(rect.height() > 0.0);
    }

    #[test]
    fn test_strip_removes_all_widgets() {
        let (mut doc, page_id) = doc_with_annots(vec![
            widget("f1", [0.0, 0.0, 10.0, 10.0]),
            widget("f2", [0.0, 20.0, 10.0, 30.0]),
        ]);

        let removed = strip_widgets(&mut doc, page_id).unwrap();
        assert_eq!(removed, 2);
        assert!(collect_widgets(&doc, page_id).unwrap().is_empty());

        // Annots entry is gone entirely
        let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
        assert!(page_dict.get(b"Annots").is_err());
    }

    #[test]
    fn test_strip_keeps_other_annotations() {
        let link = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        };
        let (mut doc, page_id) = doc_with_annots(vec![link, widget("f1", [0.0, 0.0, 10.0, 10.0])]);

        let removed = strip_widgets(&mut doc, page_id).unwrap();
        assert_eq!(removed, 1);

        let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let annots = page_dict.get(b"Annots").unwrap().as_array().unwrap();
        assert_eq!(annots.len(), 1);
    }

    #[test]
    fn test_strip_drops_broken_references() {
        let (mut doc, page_id) = doc_with_annots(vec![widget("f1", [0.0, 0.0, 10.0, 10.0])]);

        // Inject a dangling reference into Annots
        let bogus = (9999u32, 0u16);
        {
            let page_dict = doc.get_object_mut(page_id).unwrap().as_dict_mut().unwrap();
            let annots = page_dict.get_mut(b"Annots").unwrap().as_array_mut().unwrap();
            annots.push(Object::Reference(bogus));
        }

        let removed = strip_widgets(&mut doc, page_id).unwrap();
        assert_eq!(removed, 1);

        let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
        assert!(page_dict.get(b"Annots").is_err());
    }

    #[test]
    fn test_remove_acroform() {
        let (mut doc, _page_id) = doc_with_annots(vec![]);

        assert!(remove_acroform(&mut doc));
        // Second call finds nothing
        assert!(!remove_acroform(&mut doc));
    }

    #[test]
    fn test_decode_pdf_string_plain() {
        assert_eq!(decode_pdf_string(b"full_name"), "full_name");
    }

    #[test]
    fn test_decode_pdf_string_utf16be() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "اسم".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_pdf_string(&bytes), "اسم");
    }

    #[test]
    fn test_rect_dimensions() {
        let rect = Rect::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(rect.width(), 100.0);
        assert_eq!(rect.height(), 50.0);
    }
}
