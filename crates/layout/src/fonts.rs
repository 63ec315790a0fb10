//! Font selection and text measurement.
//!
//! Two kinds of faces are supported: the PDF base-14 families, measured with
//! their built-in AFM width tables, and a single host-supplied TrueType face,
//! measured from its `hmtx` advances through `ttf-parser`. All text is encoded
//! as WinAnsi, so every face exposes widths for the 256 WinAnsi code points.

use notepress_types::text::{win_ansi_char, win_ansi_code};
use std::fmt;
use std::sync::Arc;

/// A base-14 family or the embedded custom face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FontFamily {
    Helvetica,
    Times,
    Courier,
    Custom,
}

impl FontFamily {
    /// Maps a user-facing family name onto a built-in family.
    pub fn from_builtin_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "helvetica" | "arial" | "sans-serif" | "sans" => Some(FontFamily::Helvetica),
            "times" | "times new roman" | "times-roman" | "serif" => Some(FontFamily::Times),
            "courier" | "courier new" | "monospace" | "mono" => Some(FontFamily::Courier),
            _ => None,
        }
    }
}

/// Identifies one face of the document: family plus resolved variant.
///
/// This is what laid-out text carries and what the renderer turns into a
/// font resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontKey {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub const fn new(family: FontFamily, bold: bool, italic: bool) -> Self {
        Self { family, bold, italic }
    }

    pub const fn regular(family: FontFamily) -> Self {
        Self::new(family, false, false)
    }

    /// The PDF base-14 name, or `None` for the custom face.
    pub fn base14_name(&self) -> Option<&'static str> {
        let name = match (self.family, self.bold, self.italic) {
            (FontFamily::Helvetica, false, false) => "Helvetica",
            (FontFamily::Helvetica, true, false) => "Helvetica-Bold",
            (FontFamily::Helvetica, false, true) => "Helvetica-Oblique",
            (FontFamily::Helvetica, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Times, false, false) => "Times-Roman",
            (FontFamily::Times, true, false) => "Times-Bold",
            (FontFamily::Times, false, true) => "Times-Italic",
            (FontFamily::Times, true, true) => "Times-BoldItalic",
            (FontFamily::Courier, false, false) => "Courier",
            (FontFamily::Courier, true, false) => "Courier-Bold",
            (FontFamily::Courier, false, true) => "Courier-Oblique",
            (FontFamily::Courier, true, true) => "Courier-BoldOblique",
            (FontFamily::Custom, _, _) => return None,
        };
        Some(name)
    }
}

// AFM advance widths (1/1000 em) for WinAnsi 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

const COURIER_WIDTH: u16 = 600;
const BULLET_WIDTH: u16 = 350;

fn builtin_width(key: FontKey, code: u8) -> u16 {
    if key.family == FontFamily::Courier {
        return COURIER_WIDTH;
    }
    let (table, fallback): (&[u16; 95], u16) = match (key.family, key.bold) {
        (FontFamily::Times, _) => (&TIMES_ROMAN, 500),
        (_, true) => (&HELVETICA_BOLD, 556),
        _ => (&HELVETICA, 556),
    };
    match code {
        0x20..=0x7E => table[(code - 0x20) as usize],
        0x95 => BULLET_WIDTH,
        0xA0 => table[0],
        _ => fallback,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FontLoadError {
    #[error("Could not parse font data: {0}")]
    Parse(String),
    #[error("Font has a zero units-per-em value")]
    InvalidMetrics,
}

/// A host-supplied TrueType face, parsed once and shared with the renderer.
pub struct CustomFont {
    pub family_name: String,
    pub postscript_name: String,
    pub data: Arc<Vec<u8>>,
    /// Advance widths in 1/1000 em, indexed by WinAnsi code.
    pub widths: [u16; 256],
    pub ascent: i16,
    pub descent: i16,
    pub cap_height: i16,
    pub bbox: [i16; 4],
    pub italic: bool,
}

impl fmt::Debug for CustomFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFont")
            .field("family_name", &self.family_name)
            .field("postscript_name", &self.postscript_name)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl CustomFont {
    pub fn parse(family_name: &str, data: Vec<u8>) -> Result<Self, FontLoadError> {
        let face = ttf_parser::Face::parse(&data, 0).map_err(|e| FontLoadError::Parse(e.to_string()))?;
        let units = face.units_per_em();
        if units == 0 {
            return Err(FontLoadError::InvalidMetrics);
        }
        let scale = |v: i32| -> i32 { v * 1000 / units as i32 };

        let missing = face
            .glyph_index(' ')
            .and_then(|gid| face.glyph_hor_advance(gid))
            .map(|adv| scale(adv as i32) as u16)
            .unwrap_or(500);
        let mut widths = [missing; 256];
        for (code, slot) in widths.iter_mut().enumerate() {
            if let Some(ch) = win_ansi_char(code as u8)
                && let Some(adv) = face.glyph_index(ch).and_then(|gid| face.glyph_hor_advance(gid))
            {
                *slot = scale(adv as i32).clamp(0, u16::MAX as i32) as u16;
            }
        }

        let postscript_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|n| n.to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| sanitize_postscript_name(family_name));

        let bbox = face.global_bounding_box();
        let ascent = scale(face.ascender() as i32) as i16;
        let descent = scale(face.descender() as i32) as i16;
        let cap_height = face.capital_height().map(|h| scale(h as i32) as i16).unwrap_or(ascent);

        Ok(Self {
            family_name: family_name.to_string(),
            postscript_name: sanitize_postscript_name(&postscript_name),
            widths,
            ascent,
            descent,
            cap_height,
            bbox: [
                scale(bbox.x_min as i32) as i16,
                scale(bbox.y_min as i32) as i16,
                scale(bbox.x_max as i32) as i16,
                scale(bbox.y_max as i32) as i16,
            ],
            italic: face.is_italic(),
            data: Arc::new(data),
        })
    }
}

fn sanitize_postscript_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%#".contains(*c))
        .collect();
    if cleaned.is_empty() { "CustomFont".to_string() } else { cleaned }
}

/// The faces available to one layout pass.
#[derive(Debug, Clone)]
pub struct FontSet {
    body: FontFamily,
    custom: Option<Arc<CustomFont>>,
}

impl Default for FontSet {
    fn default() -> Self {
        Self::builtin(FontFamily::Helvetica)
    }
}

impl FontSet {
    pub fn builtin(family: FontFamily) -> Self {
        Self { body: family, custom: None }
    }

    pub fn with_custom(font: CustomFont) -> Self {
        Self {
            body: FontFamily::Custom,
            custom: Some(Arc::new(font)),
        }
    }

    /// Resolves the user's font choice, falling back to Helvetica.
    ///
    /// Returns the font set and any user-visible warnings produced on the way.
    pub fn resolve(family_name: &str, custom_data: Option<Vec<u8>>) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        if let Some(data) = custom_data {
            match CustomFont::parse(family_name, data) {
                Ok(font) => {
                    log::debug!("Loaded custom font '{}' ({})", font.family_name, font.postscript_name);
                    return (Self::with_custom(font), warnings);
                }
                Err(e) => {
                    let msg = format!("Custom font '{}' could not be loaded ({}); using Helvetica", family_name, e);
                    log::warn!("{}", msg);
                    warnings.push(msg);
                    return (Self::default(), warnings);
                }
            }
        }
        match FontFamily::from_builtin_name(family_name) {
            Some(family) => (Self::builtin(family), warnings),
            None => {
                let msg = format!("Unknown font family '{}'; using Helvetica", family_name);
                log::warn!("{}", msg);
                warnings.push(msg);
                (Self::default(), warnings)
            }
        }
    }

    pub fn body_family(&self) -> FontFamily {
        self.body
    }

    pub fn custom(&self) -> Option<&Arc<CustomFont>> {
        self.custom.as_ref()
    }

    /// The body face in the requested variant.
    pub fn body(&self, bold: bool, italic: bool) -> FontKey {
        FontKey::new(self.body, bold, italic)
    }

    /// Code spans are always set in Courier.
    pub fn code(&self) -> FontKey {
        FontKey::regular(FontFamily::Courier)
    }

    fn char_width(&self, key: FontKey, c: char) -> u16 {
        let code = win_ansi_code(c).unwrap_or(b'?');
        match (key.family, &self.custom) {
            (FontFamily::Custom, Some(font)) => font.widths[code as usize],
            (FontFamily::Custom, None) => builtin_width(FontKey::new(FontFamily::Helvetica, key.bold, key.italic), code),
            _ => builtin_width(key, code),
        }
    }

    /// Width of `text` in points at `size`.
    pub fn measure(&self, text: &str, key: FontKey, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(key, c) as u32).sum();
        units as f32 * size / 1000.0
    }
}
