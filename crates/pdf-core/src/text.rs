//! Text rendering operators
//!
//! Generates raw PDF content-stream operators for a single text run. The
//! string token is pre-encoded by the font ([`crate::Font::encode_show_text`]),
//! so this module only deals with positioning, color and alignment.

use crate::{Align, Color};

/// Everything needed to place one run of text on a page
#[derive(Debug, Clone)]
pub struct TextRenderContext {
    /// Resource name of the font in the page's /Font dictionary (e.g. "F1")
    pub font_resource: String,
    /// Font size in points
    pub font_size: f32,
    /// Fill color
    pub color: Color,
    /// Horizontal anchor position in PDF coordinates
    pub x: f32,
    /// Baseline position in PDF coordinates (origin bottom-left)
    pub y: f32,
    /// Measured width of the text at `font_size`, used for alignment
    pub text_width: f32,
    /// Horizontal alignment relative to `x`
    pub align: Align,
}

/// Generate content-stream operators for one text run
///
/// `encoded_text` must already be a valid PDF string token, either a hex
/// string (`<...>`) or an escaped literal (`(...)`).
pub fn generate_text_operators(ctx: &TextRenderContext, encoded_text: &str) -> Vec<u8> {
    let x = match ctx.align {
        Align::Left => ctx.x,
        Align::Center => ctx.x - ctx.text_width / 2.0,
        Align::Right => ctx.x - ctx.text_width,
    };

    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_resource, ctx.font_size));
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));
    ops.push_str(&format!("{} {} Td\n", x, ctx.y));
    ops.push_str(&format!("{encoded_text} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx(align: Align) -> TextRenderContext {
        TextRenderContext {
            font_resource: "F1".to_string(),
            font_size: 12.0,
            color: Color::rgb(0.0, 0.0, 0.0),
            x: 100.0,
            y: 700.0,
            text_width: 40.0,
            align,
        }
    }

    #[test]
    fn test_left_aligned_operators() {
        let ops = generate_text_operators(&ctx(Align::Left), "<0041>");
        let s = String::from_utf8(ops).unwrap();

        assert_eq!(
            s,
            "BT\n/F1 12 Tf\n0 0 0 rg\n100 700 Td\n<0041> Tj\nET\n"
        );
    }

    #[test]
    fn test_center_alignment_shifts_by_half_width() {
        let ops = generate_text_operators(&ctx(Align::Center), "(hi)");
        let s = String::from_utf8(ops).unwrap();

        assert!(s.contains("80 700 Td"));
    }

    #[test]
    fn test_right_alignment_shifts_by_full_width() {
        let ops = generate_text_operators(&ctx(Align::Right), "(hi)");
        let s = String::from_utf8(ops).unwrap();

        assert!(s.contains("60 700 Td"));
    }

    #[test]
    fn test_color_operator() {
        let mut c = ctx(Align::Left);
        c.color = Color::rgb(0.2, 0.2, 0.6);

        let ops = generate_text_operators(&c, "(x)");
        let s = String::from_utf8(ops).unwrap();

        assert!(s.contains("0.2 0.2 0.6 rg"));
    }
}
