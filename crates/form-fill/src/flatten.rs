//! Flattening: replace interactive regions with fitted static text
//!
//! Works in three passes over the document: capture every region's geometry
//! into owned values, strip all widget annotations and the form catalog
//! entry, then draw each field value where its widget used to be. Capturing
//! before deleting means region geometry never dangles.

use crate::fields::{discover_regions, FieldValues, PlacementRegion};
use crate::fit::{fit_font_size, FitParams, REGION_INSET};
use crate::Result;
use pdf_core::{Align, Font, PdfDocument};

pub(crate) fn flatten(
    doc: &mut PdfDocument,
    font_name: &str,
    font: &Font,
    values: &FieldValues,
    params: &FitParams,
) -> Result<usize> {
    let regions = discover_regions(doc)?;

    let mut removed = 0;
    for page in 1..=doc.page_count() {
        removed += doc.remove_widgets(page)?;
    }
    doc.remove_acroform();
    log::info!(
        "captured {} regions, removed {} widgets",
        regions.len(),
        removed
    );

    let mut drawn = 0;
    for region in &regions {
        match draw_region(doc, font_name, font, values, params, region) {
            Ok(true) => drawn += 1,
            Ok(false) => {}
            Err(e) => {
                log::warn!("failed to render field '{}': {e}", region.field_name);
            }
        }
    }

    Ok(drawn)
}

fn draw_region(
    doc: &mut PdfDocument,
    font_name: &str,
    font: &Font,
    values: &FieldValues,
    params: &FitParams,
    region: &PlacementRegion,
) -> Result<bool> {
    let raw = match values.get(&region.field_name) {
        Some(value) if !value.is_empty() => value,
        _ => {
            log::debug!("no value for field '{}'", region.field_name);
            return Ok(false);
        }
    };

    let display = arabic_text::shape(raw);
    let usable_width = region.rect.width() - REGION_INSET;
    let size = fit_font_size(font, &display, usable_width, params);

    // Text sits centered in the region, both axes. The baseline is in PDF
    // bottom-origin coordinates and gets converted to the document API's
    // top-origin before insertion.
    let page_height = doc.page_height(region.page)?;
    let baseline = region.rect.y0 + (region.rect.height() - f64::from(size)) / 2.0;
    let x = region.rect.x0 + region.rect.width() / 2.0;
    let y = page_height - baseline;

    doc.set_font(font_name, size)?;
    doc.insert_text(&display, region.page, x, y, Align::Center)?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_widgetless_document() {
        let mut doc = PdfDocument::new_with_page(595.0, 842.0).unwrap();
        let font = Font::helvetica();
        doc.add_font("body", font.clone()).unwrap();

        let mut values = FieldValues::default();
        values.insert("name", "Jane");

        let drawn = flatten(
            &mut doc,
            "body",
            &font,
            &values,
            &FitParams::default(),
        )
        .unwrap();
        assert_eq!(drawn, 0);
    }
}
