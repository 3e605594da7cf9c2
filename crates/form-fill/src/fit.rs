//! Font size fitting
//!
//! Finds the largest size, stepping down from a starting value, at which a
//! string fits inside a region's usable width.

use pdf_core::Font;

/// Horizontal breathing room kept inside a region, in points
pub const REGION_INSET: f64 = 2.0;

/// Parameters of the fit search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    /// Size tried first
    pub start: f32,
    /// Floor below which the search gives up
    pub min: f32,
    /// Decrement between attempts
    pub step: f32,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            start: 12.0,
            min: 6.0,
            step: 0.5,
        }
    }
}

/// Find the largest size at which `text` fits in `max_width` points
///
/// Sizes are tried from `params.start` downward in `params.step`
/// decrements. If even the floor size does not fit, the floor is returned
/// anyway: an overflowing region is preferable to dropping the value.
pub fn fit_font_size(font: &Font, text: &str, max_width: f64, params: &FitParams) -> f32 {
    let mut size = params.start;
    while size > params.min {
        if f64::from(font.text_width_points(text, size)) <= max_width {
            return size;
        }
        size -= params.step;
    }
    params.min
}
