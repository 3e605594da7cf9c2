//! Attachment pagination
//!
//! Each attachment becomes one or more pages appended to the output
//! document. PDFs get an A4 title page followed by all of their pages;
//! raster images get a single A4 page with the title on top and the image
//! letterboxed below it. A bad attachment is logged and skipped without
//! touching the others.

use pdf_core::{get_dimensions, Align, Color, PdfDocument};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub(crate) const A4_WIDTH: f64 = 595.0;
pub(crate) const A4_HEIGHT: f64 = 842.0;
const MARGIN: f64 = 36.0;
/// Vertical room reserved under the top margin for the title line
const TITLE_SPACE: f64 = 70.0;
const PDF_TITLE_SIZE: f32 = 24.0;
const IMAGE_TITLE_SIZE: f32 = 20.0;

/// Fallback title ("attachment") when the caller provides none
const DEFAULT_TITLE: &str = "مرفق";

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

fn title_color() -> Color {
    Color::rgb(0.2, 0.2, 0.6)
}

/// A file to append to the rendered document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// Path to the attachment file
    pub path: PathBuf,
    /// Title shown above the attachment; falls back to a generic label
    #[serde(default)]
    pub display_name: Option<String>,
}

/// How an attachment will be paginated, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Pdf,
    Image,
    Unsupported,
}

impl Attachment {
    pub fn kind(&self) -> AttachmentKind {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => AttachmentKind::Pdf,
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => AttachmentKind::Image,
            _ => AttachmentKind::Unsupported,
        }
    }

    /// The title drawn above the attachment
    pub fn title(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_TITLE,
        }
    }
}

/// Append one attachment to the document; returns whether it was appended
pub(crate) fn append_attachment(
    doc: &mut PdfDocument,
    attachment: &Attachment,
    font_name: &str,
) -> bool {
    let kind = attachment.kind();
    if kind == AttachmentKind::Unsupported {
        log::warn!(
            "unsupported attachment type, skipping: {}",
            attachment.path.display()
        );
        return false;
    }

    let data = match std::fs::read(&attachment.path) {
        Ok(data) if !data.is_empty() => data,
        Ok(_) => {
            log::warn!("attachment is empty, skipping: {}", attachment.path.display());
            return false;
        }
        Err(e) => {
            log::warn!(
                "attachment unreadable, skipping: {} ({e})",
                attachment.path.display()
            );
            return false;
        }
    };

    let title = arabic_text::shape(attachment.title());
    let appended = match kind {
        AttachmentKind::Pdf => append_pdf(doc, &data, &title, font_name),
        AttachmentKind::Image => append_image(doc, &data, &title, font_name),
        AttachmentKind::Unsupported => false,
    };

    if appended {
        log::info!("appended attachment {}", attachment.path.display());
    } else {
        log::warn!("skipped attachment {}", attachment.path.display());
    }
    appended
}

fn append_pdf(doc: &mut PdfDocument, data: &[u8], title: &str, font_name: &str) -> bool {
    // Parse before touching the output document, so a corrupt file leaves
    // no stray title page behind
    let attachment_doc = match PdfDocument::open_from_bytes(data) {
        Ok(d) => d,
        Err(e) => {
            log::warn!("attachment is not a readable PDF: {e}");
            return false;
        }
    };

    if let Err(e) = new_titled_page(doc, title, font_name, PDF_TITLE_SIZE) {
        log::warn!("failed to draw attachment title page: {e}");
        return false;
    }

    match doc.append_pages_from(attachment_doc) {
        Ok(_pages) => true,
        Err(e) => {
            log::warn!("failed to append attachment pages: {e}");
            false
        }
    }
}

fn append_image(doc: &mut PdfDocument, data: &[u8], title: &str, font_name: &str) -> bool {
    let dims = match get_dimensions(data) {
        Ok(d) if d.width > 0 && d.height > 0 => d,
        Ok(_) => {
            log::warn!("attachment image has zero dimensions");
            return false;
        }
        Err(e) => {
            log::warn!("attachment image body is not embeddable: {e}");
            return false;
        }
    };

    let page = match new_titled_page(doc, title, font_name, IMAGE_TITLE_SIZE) {
        Ok(page) => page,
        Err(e) => {
            log::warn!("failed to draw attachment title: {e}");
            return false;
        }
    };

    // Letterbox: fit inside the margins and title band, centered
    // horizontally, anchored under the title
    let max_width = A4_WIDTH - 2.0 * MARGIN;
    let max_height = A4_HEIGHT - 2.0 * MARGIN - TITLE_SPACE;
    let scale = (max_width / dims.width as f64).min(max_height / dims.height as f64);
    let width = dims.width as f64 * scale;
    let height = dims.height as f64 * scale;
    let x = (A4_WIDTH - width) / 2.0;
    let y = MARGIN + TITLE_SPACE;

    match doc.insert_image(data, page, x, y, width, height) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("failed to place attachment image: {e}");
            false
        }
    }
}

/// Add a blank A4 page carrying only the title line
fn new_titled_page(
    doc: &mut PdfDocument,
    title: &str,
    font_name: &str,
    size: f32,
) -> crate::Result<usize> {
    let page = doc.add_page(A4_WIDTH, A4_HEIGHT)?;

    // Baseline sits one title-height under the top margin band
    let baseline_y = if size >= PDF_TITLE_SIZE {
        MARGIN + f64::from(size)
    } else {
        20.0 + f64::from(size)
    };

    doc.set_font(font_name, size)?;
    doc.set_text_color(title_color());
    doc.insert_text(title, page, A4_WIDTH / 2.0, baseline_y, Align::Center)?;
    doc.set_text_color(Color::black());

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn att(path: &str) -> Attachment {
        Attachment {
            path: PathBuf::from(path),
            display_name: None,
        }
    }

    #[test]
    fn test_kind_by_extension() {
        assert_eq!(att("scan.pdf").kind(), AttachmentKind::Pdf);
        assert_eq!(att("photo.JPG").kind(), AttachmentKind::Image);
        assert_eq!(att("photo.jpeg").kind(), AttachmentKind::Image);
        assert_eq!(att("anim.gif").kind(), AttachmentKind::Image);
        assert_eq!(att("pic.webp").kind(), AttachmentKind::Image);
        assert_eq!(att("notes.txt").kind(), AttachmentKind::Unsupported);
        assert_eq!(att("no_extension").kind(), AttachmentKind::Unsupported);
    }

    #[test]
    fn test_title_defaults() {
        assert_eq!(att("a.pdf").title(), DEFAULT_TITLE);

        let mut with_name = att("a.pdf");
        with_name.display_name = Some("Contract".to_string());
        assert_eq!(with_name.title(), "Contract");

        let mut blank_name = att("a.pdf");
        blank_name.display_name = Some("   ".to_string());
        assert_eq!(blank_name.title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_unsupported_is_skipped_without_pages() {
        let mut doc = PdfDocument::new_with_page(A4_WIDTH, A4_HEIGHT).unwrap();
        doc.add_font("body", pdf_core::Font::helvetica()).unwrap();

        assert!(!append_attachment(&mut doc, &att("notes.txt"), "body"));
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let mut doc = PdfDocument::new_with_page(A4_WIDTH, A4_HEIGHT).unwrap();
        doc.add_font("body", pdf_core::Font::helvetica()).unwrap();

        assert!(!append_attachment(&mut doc, &att("/nope/gone.pdf"), "body"));
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_corrupt_pdf_leaves_no_title_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.5 garbage").unwrap();

        let mut doc = PdfDocument::new_with_page(A4_WIDTH, A4_HEIGHT).unwrap();
        doc.add_font("body", pdf_core::Font::helvetica()).unwrap();

        let attachment = Attachment {
            path,
            display_name: Some("Broken".to_string()),
        };
        assert!(!append_attachment(&mut doc, &attachment, "body"));
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_serde_shape() {
        let json = r#"{"path":"scan.pdf","display_name":"Scan"}"#;
        let attachment: Attachment = serde_json::from_str(json).unwrap();
        assert_eq!(attachment.title(), "Scan");

        let bare: Attachment = serde_json::from_str(r#"{"path":"scan.pdf"}"#).unwrap();
        assert!(bare.display_name.is_none());
    }
}
