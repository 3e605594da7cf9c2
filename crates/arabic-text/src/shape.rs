//! Contextual shaping and bidirectional reordering

use unicode_bidi::BidiInfo;

/// Check whether a string contains any Arabic-script characters
///
/// Covers the main Arabic block, its supplements, and the presentation
/// forms (already-shaped text counts as Arabic too).
pub fn has_arabic(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c as u32,
            0x0600..=0x06FF
            | 0x0750..=0x077F
            | 0x08A0..=0x08FF
            | 0xFB50..=0xFDFF
            | 0xFE70..=0xFEFF
        )
    })
}

/// Prepare a logical-order string for display
///
/// Arabic letters are replaced with their contextual presentation forms
/// (joined glyphs, lam-alef ligatures) and the whole string is reordered
/// into visual order, so a renderer that places characters strictly
/// left-to-right shows it correctly. Strings without Arabic content are
/// returned unchanged.
pub fn shape(text: &str) -> String {
    if text.is_empty() || !has_arabic(text) {
        return text.to_string();
    }

    let joined = arabic_reshaper::arabic_reshape(text);
    let display = reorder_visual(&joined);
    log::debug!("shaped {} chars of mixed-direction text", text.chars().count());
    display
}

/// Reorder a string into visual order, paragraph by paragraph
fn reorder_visual(text: &str) -> String {
    let bidi = BidiInfo::new(text, None);
    let mut out = String::with_capacity(text.len());
    for paragraph in &bidi.paragraphs {
        let line = paragraph.range.clone();
        out.push_str(&bidi.reorder_line(paragraph, line));
    }
    out
}
