//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents
//! - Embedding TrueType fonts (with a built-in Helvetica fallback)
//! - Inserting text and images at specific coordinates
//! - Discovering and removing AcroForm widget annotations
//! - Appending blank pages and whole documents
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, Font, PdfDocument};
//!
//! let mut doc = PdfDocument::open("template.pdf")?;
//! doc.add_font("body", Font::truetype("body", &ttf_bytes)?)?;
//! doc.set_font("body", 12.0)?;
//! doc.insert_text("Hello, World!", 1, 100.0, 700.0, Align::Left)?;
//! doc.save("output.pdf")?;
//! ```

mod document;
mod font;
mod image;
mod text;
mod widget;

pub use document::{Color, PdfDocument};
pub use font::{BuiltinFont, Font, FontData};
pub use image::{get_dimensions, ImageDimensions};
pub use text::{generate_text_operators, TextRenderContext};
pub use widget::{Rect, WidgetInfo};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
