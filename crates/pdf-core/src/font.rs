//! Font handling for PDF documents
//!
//! Two kinds of fonts are supported:
//! - [`FontData`]: an embedded TrueType font, written into the PDF as a
//!   Type0/CIDFontType2 pair with Identity-H encoding and a ToUnicode CMap.
//! - [`BuiltinFont`]: a base-14 standard font (Helvetica) that every PDF
//!   viewer ships, usable without any font file on disk.

use crate::{PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::HashSet;

/// A font usable for text insertion
#[derive(Debug, Clone)]
pub enum Font {
    /// Embedded TrueType font
    TrueType(FontData),
    /// Base-14 standard font, no embedding required
    Builtin(BuiltinFont),
}

impl Font {
    /// Create an embedded TrueType font from raw TTF bytes
    pub fn truetype(name: &str, ttf_data: &[u8]) -> Result<Self> {
        Ok(Font::TrueType(FontData::from_ttf(name, ttf_data)?))
    }

    /// The built-in Helvetica font, always available
    pub fn helvetica() -> Self {
        Font::Builtin(BuiltinFont::Helvetica)
    }

    /// PDF base font name
    pub fn name(&self) -> &str {
        match self {
            Font::TrueType(data) => &data.name,
            Font::Builtin(builtin) => builtin.base_font(),
        }
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        match self {
            Font::TrueType(data) => data.text_width_points(text, font_size),
            Font::Builtin(builtin) => builtin.text_width_points(text, font_size),
        }
    }

    /// Encode text as the string token of a `Tj` operator
    ///
    /// TrueType fonts use Identity-H hex strings of glyph IDs; built-in
    /// fonts use an escaped literal string in WinAnsi encoding.
    pub(crate) fn encode_show_text(&self, text: &str) -> String {
        match self {
            Font::TrueType(data) => data.encode_text_hex(text),
            Font::Builtin(builtin) => builtin.encode_literal(text),
        }
    }

    /// Record characters drawn with this font (TrueType width/CMap tables)
    pub(crate) fn note_usage(&mut self, text: &str) {
        if let Font::TrueType(data) = self {
            data.add_chars(text);
        }
    }
}

/// Font data structure for embedded TrueType fonts
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier
    pub name: String,
    /// Raw TTF data
    pub ttf_data: Vec<u8>,
    /// Characters drawn with this font (for the /W and ToUnicode tables)
    pub used_chars: HashSet<char>,
    /// Parsed font face
    face: Option<ttf_parser::Face<'static>>,
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

impl FontData {
    /// Create font data from TTF bytes
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        let data = ttf_data.to_vec();

        // The face borrows the font bytes for the document lifetime, so the
        // buffer is leaked once per loaded font.
        let static_data: &'static [u8] = Box::leak(data.clone().into_boxed_slice());

        let face = ttf_parser::Face::parse(static_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{e:?}")))?;

        Ok(Self {
            name: name.to_string(),
            ttf_data: data,
            used_chars: HashSet::new(),
            face: Some(face),
        })
    }

    /// Add characters to the used set
    pub fn add_chars(&mut self, text: &str) {
        for c in text.chars() {
            self.used_chars.insert(c);
        }
    }

    /// Get glyph ID for a character
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.face
            .as_ref()
            .and_then(|face| face.glyph_index(c).map(|id| id.0))
    }

    /// Check if font has a glyph for the given character
    pub fn has_glyph(&self, c: char) -> bool {
        self.glyph_id(c).map(|id| id != 0).unwrap_or(false)
    }

    /// Get glyph advance width in font units
    pub fn glyph_advance(&self, c: char) -> Option<u16> {
        self.face.as_ref().and_then(|face| {
            let glyph_id = face.glyph_index(c)?;
            face.glyph_hor_advance(glyph_id)
        })
    }

    /// Get font units per em
    pub fn units_per_em(&self) -> u16 {
        self.face
            .as_ref()
            .map(|face| face.units_per_em())
            .unwrap_or(1000)
    }

    /// Get font ascender
    pub fn ascender(&self) -> i16 {
        self.face
            .as_ref()
            .map(|face| face.ascender())
            .unwrap_or(800)
    }

    /// Get font descender
    pub fn descender(&self) -> i16 {
        self.face
            .as_ref()
            .map(|face| face.descender())
            .unwrap_or(-200)
    }

    /// Calculate text width in font units
    pub fn text_width(&self, text: &str) -> u32 {
        text.chars()
            .filter_map(|c| self.glyph_advance(c))
            .map(|w| w as u32)
            .sum()
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let width = self.text_width(text);
        let units_per_em = self.units_per_em() as f32;
        (width as f32 / units_per_em) * font_size
    }

    /// Encode text as hex string for the PDF Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::new();
        for c in text.chars() {
            let gid = self.glyph_id(c).unwrap_or(0);
            result.push_str(&format!("{gid:04X}"));
        }
        format!("<{result}>")
    }

    /// Generate all PDF objects needed to embed this font
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let font_name = Object::Name(self.name.clone().into());

        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_stream = Stream::new(
            Dictionary::from_iter(vec![
                ("Type", "CMap".into()),
                ("Length", (tounicode_content.len() as i32).into()),
            ]),
            tounicode_content.as_bytes().to_vec(),
        );

        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![(
                "Length1",
                (self.ttf_data.len() as i32).into(),
            )]),
            self.ttf_data.clone(),
        );

        let units_per_em = self.units_per_em() as i32;
        let ascender = self.ascender();
        let descender = self.descender();

        let font_bbox = vec![
            0.into(),
            descender.into(),
            units_per_em.into(),
            ascender.into(),
        ];

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()), // Symbolic font
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascender.into()),
            ("Descent", descender.into()),
            ("CapHeight", ascender.into()),
            ("StemV", 80.into()),
        ]);

        let widths_array = self.generate_widths_array();

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("W", widths_array.into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
        ]);

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// Generate the /W array of per-glyph advance widths
    fn generate_widths_array(&self) -> Vec<Object> {
        let mut widths = Vec::new();
        let face = match &self.face {
            Some(f) => f,
            None => return widths,
        };

        let mut gids: Vec<u16> = self
            .used_chars
            .iter()
            .filter_map(|&c| self.glyph_id(c))
            .collect();
        gids.sort();
        gids.dedup();

        // Individual mapping format: [gid1 [width1] gid2 [width2] ...]
        for gid in gids {
            let glyph_id = ttf_parser::GlyphId(gid);
            let advance = face.glyph_hor_advance(glyph_id).unwrap_or(1000);
            widths.push(gid.into());
            widths.push(vec![advance.into()].into());
        }

        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let mut char_list: Vec<char> = self.used_chars.iter().copied().collect();
        char_list.sort_by_key(|c| *c as u32);

        if !char_list.is_empty() {
            // PDF spec recommends limiting bfchar sections to 100 entries
            for chunk in char_list.chunks(100) {
                cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
                for c in chunk {
                    let gid = self.glyph_id(*c).unwrap_or(0);
                    let unicode = *c as u32;
                    cmap.push_str(&format!("<{gid:04X}> <{unicode:04X}>\n"));
                }
                cmap.push_str("endbfchar\n");
            }
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}

/// A PDF base-14 standard font
///
/// Width metrics are the standard Adobe AFM values in 1/1000 em units,
/// so text can be measured without any font file present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
}

impl BuiltinFont {
    /// PDF /BaseFont name
    pub fn base_font(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
        }
    }

    /// Advance width of a character in 1/1000 em units
    pub fn char_width(&self, c: char) -> u16 {
        helvetica_advance(c)
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        (units as f32 / 1000.0) * font_size
    }

    /// Encode text as an escaped literal string token for the Tj operator
    ///
    /// Characters outside Latin-1 cannot be expressed with WinAnsi encoding
    /// and are replaced with `?`.
    pub(crate) fn encode_literal(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('(');
        for c in text.chars() {
            let code = if (c as u32) <= 0xFF { c as u32 } else { b'?' as u32 };
            match code {
                0x28 | 0x29 | 0x5C => {
                    out.push('\\');
                    out.push(code as u8 as char);
                }
                0x20..=0x7E => out.push(code as u8 as char),
                // Control and high Latin-1 bytes go out as octal escapes
                _ => out.push_str(&format!("\\{code:03o}")),
            }
        }
        out.push(')');
        out
    }

    /// The font dictionary referenced from page resources
    pub(crate) fn to_font_dictionary(&self) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type1".into()),
            ("BaseFont", self.base_font().into()),
            ("Encoding", "WinAnsiEncoding".into()),
        ])
    }
}

/// Standard Helvetica AFM advance widths for the ASCII range
///
/// Unmapped characters fall back to 556 (the digit/lowercase average),
/// which keeps fit calculations conservative rather than optimistic.
fn helvetica_advance(c: char) -> u16 {
    match c {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | 'I' | '\\' => 278,
        '"' => 355,
        '\'' => 191,
        '(' | ')' | '-' | '`' | 'r' | '[' | ']' => 333,
        '*' => 389,
        '+' | '<' | '=' | '>' | '~' => 584,
        '%' => 889,
        '&' | 'A' | 'B' | 'E' | 'F' | 'K' | 'P' | 'V' | 'X' | 'Y' => 667,
        '@' => 1015,
        '?' | '#' | '$' | '_' | '0'..='9' => 556,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722,
        'G' | 'O' | 'Q' => 778,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'L' => 556,
        'M' | 'm' => 833,
        'S' => 667,
        'T' | 'Z' => 611,
        'W' => 944,
        '^' => 469,
        'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 556,
        'f' | 't' => 278,
        'i' | 'j' | 'l' => 222,
        'w' => 722,
        '{' | '}' => 334,
        '|' => 260,
        _ => 556,
    }
}
