//! Document assembly and atomic output

use crate::attach::{append_attachment, Attachment};
use crate::fields::FieldValues;
use crate::fit::FitParams;
use crate::flatten::flatten;
use crate::photo::place_photo;
use crate::{RenderError, Result};
use pdf_core::{Font, PdfDocument};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Identifier the text font is registered under in rendered documents
const FONT_NAME: &str = "body";

/// Candidate TrueType files probed for the text font
///
/// Resolution happens once, at [`FormRenderer`] construction; individual
/// renders never touch the filesystem for fonts.
#[derive(Debug, Clone)]
pub struct FontSources {
    pub candidates: Vec<PathBuf>,
}

impl Default for FontSources {
    fn default() -> Self {
        Self {
            candidates: vec![
                PathBuf::from("C:/Windows/Fonts/arial.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
                PathBuf::from("/usr/share/fonts/TTF/DejaVuSans.ttf"),
                PathBuf::from("assets/arial.ttf"),
            ],
        }
    }
}

impl FontSources {
    /// Resolve the first loadable candidate
    ///
    /// Falls back to the built-in Helvetica, so a renderer can always be
    /// constructed even on hosts with no font files at all.
    fn resolve(&self) -> Font {
        for candidate in &self.candidates {
            let data = match std::fs::read(candidate) {
                Ok(data) => data,
                Err(_) => continue,
            };
            match Font::truetype(FONT_NAME, &data) {
                Ok(font) => {
                    log::info!("using font {}", candidate.display());
                    return font;
                }
                Err(e) => {
                    log::warn!("unusable font {}: {e}", candidate.display());
                }
            }
        }
        log::info!("no font file found, using built-in Helvetica");
        Font::helvetica()
    }
}

/// Everything a single render needs
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub values: FieldValues,
    pub photo_path: Option<PathBuf>,
    pub attachments: Vec<Attachment>,
}

/// What a render actually produced
///
/// Skipped photos and attachments are reported here rather than failing
/// the render; details go to the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub fields_drawn: usize,
    pub photo_placed: bool,
    pub attachments_appended: usize,
    pub attachments_skipped: usize,
}

/// The composition engine
pub struct FormRenderer {
    font: Font,
    fit: FitParams,
}

impl FormRenderer {
    pub fn new(sources: FontSources) -> Self {
        Self {
            font: sources.resolve(),
            fit: FitParams::default(),
        }
    }

    /// Override the fit search parameters
    pub fn with_fit_params(mut self, fit: FitParams) -> Self {
        self.fit = fit;
        self
    }

    /// Render a template into a flat document at the output path
    ///
    /// The output file appears atomically: it is written next to its final
    /// location and renamed into place, so readers never observe a partial
    /// document.
    pub fn render(&self, request: &RenderRequest) -> Result<RenderReport> {
        if !request.template_path.exists() {
            return Err(RenderError::TemplateNotFound(
                request.template_path.clone(),
            ));
        }

        let mut doc = PdfDocument::open(&request.template_path)?;
        doc.add_font(FONT_NAME, self.font.clone())?;

        let mut report = RenderReport {
            fields_drawn: flatten(&mut doc, FONT_NAME, &self.font, &request.values, &self.fit)?,
            photo_placed: place_photo(&mut doc, request.photo_path.as_deref()),
            ..Default::default()
        };

        for attachment in &request.attachments {
            if append_attachment(&mut doc, attachment, FONT_NAME) {
                report.attachments_appended += 1;
            } else {
                report.attachments_skipped += 1;
            }
        }

        let bytes = doc.to_bytes()?;
        write_atomic(&request.output_path, &bytes)?;
        log::info!(
            "wrote {} ({} bytes, {} fields)",
            request.output_path.display(),
            bytes.len(),
            report.fields_drawn
        );

        Ok(report)
    }
}

/// Write to a sibling temp file, then rename into place
fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
