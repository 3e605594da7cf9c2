//! Field values and placement region discovery

use crate::Result;
use pdf_core::{PdfDocument, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Caller-supplied values keyed by field name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(HashMap<String, String>);

impl FieldValues {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A fillable region discovered in a template
///
/// Holds an owned copy of the widget geometry, so it stays usable after
/// the widgets themselves have been stripped from the document.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRegion {
    /// Fully qualified field name
    pub field_name: String,
    /// Page number (1-indexed)
    pub page: usize,
    /// Region rectangle in PDF coordinates
    pub rect: Rect,
}

/// Discover every fillable region in a document
///
/// Purely a read: calling this twice in a row yields identical results.
pub fn discover_regions(doc: &PdfDocument) -> Result<Vec<PlacementRegion>> {
    let mut regions = Vec::new();
    for page in 1..=doc.page_count() {
        for widget in doc.widgets(page)? {
            regions.push(PlacementRegion {
                field_name: widget.field_name,
                page,
                rect: widget.rect,
            });
        }
    }
    Ok(regions)
}
