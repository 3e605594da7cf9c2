//! Photo compositing into the first-page slot
//!
//! The slot has a fixed position on page one; the photo is stretched to
//! fill it exactly, aspect ratio notwithstanding. Every failure here is a
//! logged skip: a render without its photo is still a valid render.

use pdf_core::PdfDocument;
use std::path::Path;

/// Photo slot in top-origin page coordinates
const SLOT_LEFT: f64 = 11.5;
const SLOT_TOP: f64 = 115.0;
const SLOT_RIGHT: f64 = 103.2;
const SLOT_BOTTOM: f64 = 220.8;

/// Place the photo on the first page; returns whether it was placed
pub(crate) fn place_photo(doc: &mut PdfDocument, path: Option<&Path>) -> bool {
    let Some(path) = path else {
        return false;
    };

    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("photo unreadable, skipping: {} ({e})", path.display());
            return false;
        }
    };
    if data.is_empty() {
        log::warn!("photo is empty, skipping: {}", path.display());
        return false;
    }

    let width = SLOT_RIGHT - SLOT_LEFT;
    let height = SLOT_BOTTOM - SLOT_TOP;
    match doc.insert_image(&data, 1, SLOT_LEFT, SLOT_TOP, width, height) {
        Ok(()) => {
            log::info!("placed photo {}", path.display());
            true
        }
        Err(e) => {
            log::warn!("failed to place photo {}: {e}", path.display());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn blank_doc() -> PdfDocument {
        PdfDocument::new_with_page(595.0, 842.0).unwrap()
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_no_photo_requested() {
        let mut doc = blank_doc();
        assert!(!place_photo(&mut doc, None));
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let mut doc = blank_doc();
        let path = Path::new("/definitely/not/here.png");
        assert!(!place_photo(&mut doc, Some(path)));
    }

    #[test]
    fn test_empty_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"").unwrap();

        let mut doc = blank_doc();
        assert!(!place_photo(&mut doc, Some(&path)));
    }

    #[test]
    fn test_corrupt_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"not an image at all").unwrap();

        let mut doc = blank_doc();
        assert!(!place_photo(&mut doc, Some(&path)));
    }

    #[test]
    fn test_valid_photo_is_placed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let mut doc = blank_doc();
        assert!(place_photo(&mut doc, Some(&path)));

        // Document still saves cleanly with the embedded image
        let bytes = doc.to_bytes().unwrap();
        assert!(PdfDocument::open_from_bytes(&bytes).is_ok());
    }
}
