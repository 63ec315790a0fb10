//! Font resources: base-14 Type1 references and the embedded TrueType face.

use crate::error::RenderError;
use crate::writer::{deflate, PdfDocumentWriter};
use lopdf::{dictionary, Object, ObjectId, Stream};
use notepress_layout::{CustomFont, FontFamily, FontKey, LaidOutDocument, PageElement};
use std::collections::{BTreeMap, BTreeSet};

/// Maps every face used in a document to its page resource name.
#[derive(Debug, Default)]
pub struct FontResources {
    names: BTreeMap<FontKey, String>,
}

impl FontResources {
    /// Registers a font object for every face the document's text uses.
    pub fn register(writer: &mut PdfDocumentWriter, doc: &LaidOutDocument) -> Result<Self, RenderError> {
        let used: BTreeSet<FontKey> = doc
            .pages
            .iter()
            .flat_map(|page| page.elements.iter())
            .filter_map(|el| match el {
                PageElement::Text(t) => Some(t.font),
                _ => None,
            })
            .collect();

        let mut names = BTreeMap::new();
        let mut custom_id: Option<ObjectId> = None;
        for (i, key) in used.into_iter().enumerate() {
            let resource_name = format!("F{}", i + 1);
            let font_id = match (key.family, doc.fonts.custom()) {
                (FontFamily::Custom, Some(custom)) => match custom_id {
                    Some(id) => id,
                    None => {
                        let id = embed_truetype(writer, custom)?;
                        custom_id = Some(id);
                        id
                    }
                },
                (FontFamily::Custom, None) => {
                    log::warn!("Custom face requested without font data; substituting Helvetica");
                    writer.add_object(type1_dict(FontKey::new(FontFamily::Helvetica, key.bold, key.italic)))
                }
                _ => writer.add_object(type1_dict(key)),
            };
            writer.register_font(&resource_name, font_id);
            names.insert(key, resource_name);
        }
        log::debug!("Registered {} font resources", names.len());
        Ok(Self { names })
    }

    pub fn resource_name(&self, key: &FontKey) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn type1_dict(key: FontKey) -> lopdf::Dictionary {
    let base_font = key.base14_name().unwrap_or("Helvetica");
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Embeds the whole font program as `FontFile2` with WinAnsi widths.
fn embed_truetype(writer: &mut PdfDocumentWriter, font: &CustomFont) -> Result<ObjectId, RenderError> {
    if font.data.is_empty() {
        return Err(RenderError::Font(format!("'{}' has no font data", font.family_name)));
    }
    let program = Stream::new(
        dictionary! {
            "Length1" => font.data.len() as i64,
            "Filter" => "FlateDecode",
        },
        deflate(&font.data)?,
    );
    let program_id = writer.add_object(program);

    // Nonsymbolic, plus the italic bit.
    let flags: i64 = if font.italic { 32 | 64 } else { 32 };
    let base_font = Object::Name(font.postscript_name.as_bytes().to_vec());
    let descriptor = dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font.clone(),
        "Flags" => flags,
        "FontBBox" => font.bbox.iter().map(|v| Object::Integer(*v as i64)).collect::<Vec<_>>(),
        "ItalicAngle" => if font.italic { -12 } else { 0 },
        "Ascent" => font.ascent as i64,
        "Descent" => font.descent as i64,
        "CapHeight" => font.cap_height as i64,
        "StemV" => 80,
        "FontFile2" => program_id,
    };
    let descriptor_id = writer.add_object(descriptor);

    let widths: Vec<Object> = font.widths[32..].iter().map(|w| Object::Integer(*w as i64)).collect();
    let font_dict = dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => base_font,
        "FirstChar" => 32,
        "LastChar" => 255,
        "Widths" => widths,
        "FontDescriptor" => descriptor_id,
        "Encoding" => "WinAnsiEncoding",
    };
    log::debug!("Embedding TrueType font '{}' ({} bytes)", font.postscript_name, font.data.len());
    Ok(writer.add_object(font_dict))
}
