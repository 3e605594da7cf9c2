//! Form Fill - template flattening and document composition
//!
//! This crate turns an interactive PDF template plus caller-supplied data
//! into a single flat document:
//! - Field values are drawn as static text where the template's form
//!   widgets used to sit, shaped for Arabic and shrunk to fit each region
//! - An optional photo is composited into a fixed slot on the first page
//! - Attachment files (PDFs and raster images) are appended as extra pages,
//!   each introduced by a styled title
//! - The result is written atomically, so a crash never leaves a partial
//!   file at the output path
//!
//! # Example
//!
//! ```ignore
//! use form_fill::{FieldValues, FormRenderer, RenderRequest};
//!
//! let renderer = FormRenderer::new(Default::default());
//! let mut values = FieldValues::default();
//! values.insert("full_name", "Jane Doe");
//!
//! renderer.render(&RenderRequest {
//!     template_path: "template.pdf".into(),
//!     output_path: "out.pdf".into(),
//!     values,
//!     photo_path: None,
//!     attachments: vec![],
//! })?;
//! ```

mod attach;
mod fields;
mod fit;
mod flatten;
mod photo;
mod renderer;

pub use attach::{Attachment, AttachmentKind};
pub use fields::{FieldValues, PlacementRegion};
pub use fit::{fit_font_size, FitParams};
pub use renderer::{FontSources, FormRenderer, RenderReport, RenderRequest};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a render
///
/// Everything that can go wrong with an individual field, photo, or
/// attachment degrades with a logged diagnostic instead of surfacing here.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No file exists at the template path
    #[error("Template not found: {0}")]
    TemplateNotFound(PathBuf),

    /// The template (or rendered document) could not be read or written
    /// as a PDF
    ///
    /// A template file that exists but does not parse lands here rather
    /// than in [`RenderError::TemplateNotFound`]; either way the render
    /// aborts before any output is written.
    #[error(transparent)]
    Pdf(#[from] pdf_core::PdfError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for render operations
pub type Result<T> = std::result::Result<T, RenderError>;
