//! Output types from the layout engine.

use crate::elements::Page;
use crate::fonts::FontSet;
use notepress_traits::{RasterImage, SharedResourceData};
use notepress_types::ImageFormat;

/// Pixel data referenced by image elements.
#[derive(Debug, Clone)]
pub enum ImageResource {
    /// Encoded file bytes as resolved, with their natural pixel size.
    Encoded {
        data: SharedResourceData,
        format: ImageFormat,
        pixel_width: u32,
        pixel_height: u32,
    },
    /// RGBA pixels returned by the rasterizer.
    Raster(RasterImage),
}

/// A heading's position, used for the PDF outline.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingAnchor {
    pub level: u8,
    pub text: String,
    pub page_index: usize,
    pub y: f32,
}

/// The result of laying out one document.
#[derive(Debug, Clone)]
pub struct LaidOutDocument {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<Page>,
    pub images: Vec<ImageResource>,
    pub headings: Vec<HeadingAnchor>,
    /// Faces the renderer has to provide, custom font included.
    pub fonts: FontSet,
}

impl LaidOutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text of one page in stamping order, joined by spaces.
    pub fn page_text(&self, index: usize) -> String {
        self.pages
            .get(index)
            .map(|page| page.texts().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }
}
